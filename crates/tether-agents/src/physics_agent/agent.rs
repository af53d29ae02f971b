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

//! Defines the PhysicsAgent, the central orchestrator for the physics subsystem.

use std::time::Duration;

use tether_core::ecs::EntityId;
use tether_core::math::{deg_to_rad, Vec2};
use tether_core::physics::{BodyHandle, PhysicsError, PhysicsProvider};
use tether_core::SettingValue;
use tether_data::ecs::{BodyLink, PhysicsBody, Transform2D, World};
use tether_lanes::physics_lane::{BodyFactory, BodyReaper, FixedTimestep, TransformWriteback};

use super::{HostConfig, LeakPolicy};

/// Name of the setting that changes the world scale factor.
pub const SCALE_FACTOR_SETTING: &str = "scale-factor";

/// What one call to [`PhysicsAgent::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Fixed steps performed.
    pub steps: u32,
    /// Whether the spiral-of-death clamp dropped pending time.
    pub clamped: bool,
    /// Transforms written back.
    pub synced: usize,
    /// Release records of despawned entities processed.
    pub released: usize,
    /// Bodies reclaimed because nothing owned them.
    pub leaked: usize,
}

/// The agent responsible for managing the physics simulation.
///
/// It exclusively owns the physics provider. Other code reaches bodies only
/// through the agent's velocity and placement accessors.
pub struct PhysicsAgent {
    /// The concrete physics engine.
    provider: Box<dyn PhysicsProvider>,
    timestep: FixedTimestep,
    factory: BodyFactory,
    writeback: TransformWriteback,
    reaper: BodyReaper,
    /// World units per simulation unit.
    scale_factor: f32,
    leak_policy: LeakPolicy,
}

impl PhysicsAgent {
    /// Creates a new `PhysicsAgent` with a given provider and configuration.
    pub fn new(mut provider: Box<dyn PhysicsProvider>, config: &HostConfig) -> Self {
        provider.set_gravity(config.gravity());
        let scale_factor = if config.scale_factor.is_finite() && config.scale_factor > 0.0 {
            config.scale_factor
        } else {
            log::warn!(
                "PhysicsAgent: invalid scale factor {}, using the default",
                config.scale_factor
            );
            HostConfig::default().scale_factor
        };

        log::debug!(
            "PhysicsAgent: hosting '{}' with scale factor {scale_factor}",
            provider.name()
        );
        Self {
            provider,
            timestep: config.timestep(),
            factory: BodyFactory::new(),
            writeback: TransformWriteback::new(),
            reaper: BodyReaper::new(),
            scale_factor,
            leak_policy: config.leak_policy,
        }
    }

    /// Advances the simulation by one frame of wall-clock time.
    pub fn update(&mut self, world: &mut World, frame: Duration) -> FrameReport {
        let mut report = FrameReport::default();

        // 1. Release bodies of entities despawned since the last frame.
        let records = world.drain_released();
        if !records.is_empty() {
            log::debug!("PhysicsAgent: releasing {} despawned bodies", records.len());
            report.released = self.reaper.release(self.provider.as_mut(), records);
        }

        // 2. Simulate.
        let plan = self.timestep.advance(frame);
        if plan.clamped {
            log::debug!("PhysicsAgent: frame of {frame:?} exceeded the clamp, stepping once");
        }
        let dt = self.timestep.dt();
        for _ in 0..plan.steps {
            self.provider.step(dt);
        }
        report.steps = plan.steps;
        report.clamped = plan.clamped;

        // 3. Sync Physics World -> ECS (Transforms)
        let outcome = self
            .writeback
            .sync(world, self.provider.as_ref(), self.scale_factor);
        report.synced = outcome.synced;

        // 4. Reclaim bodies nothing owns.
        if !outcome.orphans.is_empty() {
            report.leaked = self.reaper.reclaim(self.provider.as_mut(), &outcome.orphans);
            for orphan in &outcome.orphans {
                log::error!(
                    "PhysicsAgent: leaked body {:?} tagged {:?}",
                    orphan.handle,
                    orphan.tag.entity()
                );
            }
            if self.leak_policy == LeakPolicy::Panic {
                panic!(
                    "PhysicsAgent: {} body(ies) outlived their entity",
                    outcome.orphans.len()
                );
            }
        }

        report
    }

    /// Builds the simulation body of an entity carrying a [`PhysicsBody`].
    ///
    /// A failure aborts only this entity's construction and is logged.
    pub fn instantiate(
        &mut self,
        world: &mut World,
        entity: EntityId,
    ) -> Result<BodyLink, PhysicsError> {
        let result =
            self.factory
                .instantiate(world, entity, self.provider.as_mut(), self.scale_factor);
        if let Err(err) = &result {
            match err.shape_kind() {
                Some(kind) => log::warn!("PhysicsAgent: {entity:?} has no body ({kind}): {err}"),
                None => log::warn!("PhysicsAgent: {entity:?} has no body: {err}"),
            }
        }
        result
    }

    /// Applies a runtime setting. Returns `true` if it changed anything.
    ///
    /// Only `"scale-factor"` is recognized; other keys are ignored. The new
    /// factor applies to writeback and to bodies built afterwards.
    pub fn apply_setting(&mut self, key: &str, value: &SettingValue) -> bool {
        if key != SCALE_FACTOR_SETTING {
            log::debug!("PhysicsAgent: ignoring unknown setting '{key}'");
            return false;
        }
        match value.as_f32() {
            Some(factor) if factor.is_finite() && factor > 0.0 => {
                self.scale_factor = factor;
                log::debug!("PhysicsAgent: scale factor set to {factor}");
                true
            }
            _ => {
                log::warn!("PhysicsAgent: rejected scale factor {value:?}");
                false
            }
        }
    }

    /// World units per simulation unit.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    fn owned_body(world: &World, entity: EntityId) -> Option<BodyHandle> {
        world
            .get_ref::<PhysicsBody>(entity)
            .and_then(|body| body.body())
    }

    /// Overwrites an entity's velocity, in world units per second.
    ///
    /// Does nothing for entities without a body of their own.
    pub fn set_velocity(&mut self, world: &World, entity: EntityId, velocity: Vec2) -> bool {
        let Some(handle) = Self::owned_body(world, entity) else {
            return false;
        };
        self.provider
            .set_body_velocity(handle, velocity / self.scale_factor)
    }

    /// Adds to an entity's velocity, in world units per second.
    ///
    /// Does nothing for entities without a body of their own.
    pub fn add_velocity(&mut self, world: &World, entity: EntityId, delta: Vec2) -> bool {
        let Some(handle) = Self::owned_body(world, entity) else {
            return false;
        };
        let Some(current) = self.provider.body_velocity(handle) else {
            return false;
        };
        self.provider
            .set_body_velocity(handle, current + delta / self.scale_factor)
    }

    /// An entity's velocity in world units per second.
    pub fn velocity(&self, world: &World, entity: EntityId) -> Option<Vec2> {
        let handle = Self::owned_body(world, entity)?;
        self.provider
            .body_velocity(handle)
            .map(|v| v * self.scale_factor)
    }

    /// Moves an entity and its body together.
    pub fn teleport(&mut self, world: &mut World, entity: EntityId, transform: Transform2D) -> bool {
        let Some(handle) = Self::owned_body(world, entity) else {
            return false;
        };
        let moved = self.provider.set_body_transform(
            handle,
            transform.position() / self.scale_factor,
            deg_to_rad(transform.angle),
        );
        if moved {
            world.assign(entity, transform);
        }
        moved
    }

    /// Current gravity in simulation units.
    pub fn gravity(&self) -> Vec2 {
        self.provider.gravity()
    }

    /// Changes gravity, in simulation units.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.provider.set_gravity(gravity);
    }

    /// The hosted engine.
    pub fn provider(&self) -> &dyn PhysicsProvider {
        self.provider.as_ref()
    }
}
