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

//! # Tether Infra
//!
//! Concrete simulation engines behind the `PhysicsProvider` contract defined in
//! `tether-core`. Nothing outside this crate depends on an engine type directly.

#![warn(missing_docs)]

pub mod physics;

pub use physics::native::NativePhysicsWorld;
pub use physics::rapier::RapierPhysicsWorld;
