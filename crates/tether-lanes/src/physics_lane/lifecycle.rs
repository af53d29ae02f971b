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

use tether_core::physics::{BodySnapshot, PhysicsProvider};
use tether_data::ecs::ReleasedBody;

/// Returns simulation resources of despawned entities to the engine.
#[derive(Debug, Default)]
pub struct BodyReaper;

impl BodyReaper {
    /// Creates a new `BodyReaper`.
    pub fn new() -> Self {
        Self
    }

    /// Removes owned bodies and detaches shapes left on the static body.
    ///
    /// Returns how many records were processed.
    pub fn release(&self, provider: &mut dyn PhysicsProvider, records: Vec<ReleasedBody>) -> usize {
        let count = records.len();
        for record in records {
            if let Some(handle) = record.body {
                if !provider.remove_body(handle) {
                    log::warn!(
                        "BodyReaper: body {handle:?} of {:?} was already gone",
                        record.entity
                    );
                }
            }
            for shape in record.shapes {
                provider.detach_shape(shape);
            }
        }
        count
    }

    /// Removes bodies nothing owns any more. Returns how many were removed.
    pub fn reclaim(&self, provider: &mut dyn PhysicsProvider, orphans: &[BodySnapshot]) -> usize {
        orphans
            .iter()
            .filter(|orphan| provider.remove_body(orphan.handle))
            .count()
    }
}
