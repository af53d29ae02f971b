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

use tether_core::math::rad_to_deg;
use tether_core::physics::{BodySnapshot, PhysicsProvider};
use tether_data::ecs::{PhysicsBody, Transform2D, World};

/// Result of one writeback pass.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Transforms overwritten.
    pub synced: usize,
    /// Tagged bodies no live entity owns any more.
    pub orphans: Vec<BodySnapshot>,
}

/// Copies simulated poses back into entity transforms.
#[derive(Debug, Default)]
pub struct TransformWriteback;

impl TransformWriteback {
    /// Creates a new `TransformWriteback`.
    pub fn new() -> Self {
        Self
    }

    /// Overwrites the [`Transform2D`] of every entity that owns a moving body.
    ///
    /// Untagged bodies, static bodies, and entities without a transform are
    /// skipped. A tagged body whose entity is gone, or whose entity's
    /// [`PhysicsBody`] no longer refers to it, is never written back and is
    /// returned as an orphan instead.
    pub fn sync(
        &self,
        world: &mut World,
        provider: &dyn PhysicsProvider,
        scale_factor: f32,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        for snapshot in provider.bodies() {
            let Some(entity) = snapshot.tag.entity() else {
                continue;
            };

            let owned = world
                .get_ref::<PhysicsBody>(entity)
                .is_some_and(|body| body.body() == Some(snapshot.handle));
            if !owned {
                outcome.orphans.push(snapshot);
                continue;
            }
            if !snapshot.kind.reports_motion() {
                continue;
            }

            let position = snapshot.position * scale_factor;
            let transform = Transform2D::new(position.x, position.y, rad_to_deg(snapshot.angle));
            if world.replace(entity, transform) {
                outcome.synced += 1;
            }
        }

        outcome
    }
}
