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

//! # Tether Lanes
//!
//! The hot paths of the physics bridge: turning wall-clock time into fixed
//! steps, building simulation bodies from components, writing results back,
//! and releasing bodies whose entities are gone.

#![warn(missing_docs)]

pub mod physics_lane;
