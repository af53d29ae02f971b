// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The public-facing SDK of Tether.
//!
//! A [`Scene`] owns the entity registry and the systems that act on it.
//! Systems are created by name from a [`SystemRegistry`], attach their
//! components from declarative JSON, expose script bindings, and accept
//! string-keyed settings.

#![warn(missing_docs)]

mod definition;
mod physics_system;
mod registry;
mod scene;
mod system;

pub use definition::*;
pub use physics_system::*;
pub use registry::*;
pub use scene::*;
pub use system::*;

pub mod prelude {
    //! Types most users need.
    pub use crate::{PhysicsSystem2D, Scene, SceneDefinition, System, SystemRegistry};
    pub use tether_core::ecs::EntityId;
    pub use tether_core::math::Vec2;
    pub use tether_core::SettingValue;
    pub use tether_data::ecs::Transform2D;
}
