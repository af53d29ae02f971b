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

/// Number of steps to run for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepPlan {
    /// Fixed steps to perform.
    pub steps: u32,
    /// Whether the accumulator overflowed the clamp and was discarded.
    pub clamped: bool,
}

/// Converts variable frame durations into a whole number of fixed steps.
///
/// The accumulator decides how many steps run; every step advances the
/// simulation by the same nominal `dt`. When the accumulator grows past the
/// clamp it is dropped and a single step runs, which bounds per-frame work.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    accumulator: Duration,
    step: Duration,
    clamp: Duration,
    dt: f32,
}

impl FixedTimestep {
    /// Accumulated time consumed by one step.
    pub const DEFAULT_STEP: Duration = Duration::from_millis(16);
    /// Accumulated time above which pending steps are dropped.
    pub const DEFAULT_CLAMP: Duration = Duration::from_millis(100);
    /// Simulated seconds per step.
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    /// Creates a timestep. A zero `step` is raised to one millisecond.
    pub fn new(step: Duration, clamp: Duration, dt: f32) -> Self {
        Self {
            accumulator: Duration::ZERO,
            step: step.max(Duration::from_millis(1)),
            clamp,
            dt,
        }
    }

    /// Adds a frame's elapsed time and plans the steps it pays for.
    pub fn advance(&mut self, frame: Duration) -> StepPlan {
        self.accumulator += frame;

        if self.accumulator > self.clamp {
            self.accumulator = Duration::ZERO;
            return StepPlan {
                steps: 1,
                clamped: true,
            };
        }

        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        StepPlan {
            steps,
            clamped: false,
        }
    }

    /// Simulated seconds per step.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Time not yet consumed by a step.
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Drops any pending time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP, Self::DEFAULT_CLAMP, Self::DEFAULT_DT)
    }
}
