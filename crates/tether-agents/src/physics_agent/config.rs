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

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_core::math::Vec2;
use tether_lanes::physics_lane::FixedTimestep;

/// What to do when a body outlives the entity that owned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakPolicy {
    /// Abort: a leak means a lifecycle bug.
    Panic,
    /// Reclaim the body and log an error.
    Log,
}

impl Default for LeakPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            LeakPolicy::Panic
        } else {
            LeakPolicy::Log
        }
    }
}

/// Construction-time configuration of a [`PhysicsAgent`](super::PhysicsAgent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// World units per simulation unit.
    pub scale_factor: f32,
    /// Gravity in simulation units per second squared, y pointing down.
    pub gravity: [f32; 2],
    /// Accumulated milliseconds consumed by one step.
    pub fixed_step_ms: u64,
    /// Accumulated milliseconds above which pending steps are dropped.
    pub clamp_ms: u64,
    /// Simulated seconds per step.
    pub step_dt: f32,
    /// Reaction to leaked bodies.
    pub leak_policy: LeakPolicy,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scale_factor: 30.0,
            gravity: [0.0, 9.0],
            fixed_step_ms: 16,
            clamp_ms: 100,
            step_dt: FixedTimestep::DEFAULT_DT,
            leak_policy: LeakPolicy::default(),
        }
    }
}

impl HostConfig {
    /// Gravity as a vector.
    pub fn gravity(&self) -> Vec2 {
        Vec2::from_array(self.gravity)
    }

    /// A fresh accumulator with this configuration's step sizes.
    pub fn timestep(&self) -> FixedTimestep {
        FixedTimestep::new(
            Duration::from_millis(self.fixed_step_ms),
            Duration::from_millis(self.clamp_ms),
            self.step_dt,
        )
    }
}
