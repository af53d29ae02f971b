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

//! Acts as the **[A]gent** for the physics subsystem: the simulation host.
//!
//! The agent owns the physics provider for its whole lifetime and is the only
//! thing that steps it. Each frame it releases bodies of despawned entities,
//! runs the fixed steps the elapsed time pays for, writes poses back into the
//! registry, and reclaims any body nothing owns any more.

mod agent;
mod config;

pub use agent::*;
pub use config::*;
