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

//! Physics Lane
//!
//! The physics lane is responsible for synchronizing the physics world with the ECS world.

mod body_factory;
mod fixed_timestep;
mod lifecycle;
mod writeback;

pub use body_factory::*;
pub use fixed_timestep::*;
pub use lifecycle::*;
pub use writeback::*;
