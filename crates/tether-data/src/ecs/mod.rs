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

//! The entity/component registry.
//!
//! [`World`] wraps a `hecs` world behind the small contract the physics bridge
//! consumes: `get`, `has`, `replace`, `assign`, and a `despawn` that doubles as
//! the lifecycle signal for simulation bodies.

mod components;
mod world;

pub use components::*;
pub use world::*;
