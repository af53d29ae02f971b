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

use std::any::Any;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use tether_agents::physics_agent::{FrameReport, HostConfig, PhysicsAgent};
use tether_core::ecs::EntityId;
use tether_core::math::Vec2;
use tether_core::physics::PhysicsProvider;
use tether_core::SettingValue;
use tether_data::ecs::World;
use tether_data::scene::parse_physics_body;
use tether_infra::{NativePhysicsWorld, RapierPhysicsWorld};

use crate::{ScriptFn, System};

/// Component name of declarative physics configuration.
pub const PHYSICS_COMPONENT: &str = "physics2d";

/// Script binding overwriting an entity's velocity.
pub const SET_VELOCITY_BINDING: &str = "Entity.setVelocity";

/// Script binding adding to an entity's velocity.
pub const ADD_VELOCITY_BINDING: &str = "Entity.addVelocity";

/// 2D rigid-body physics as a scene system.
///
/// Builds `physics2d` components, hosts the simulation through a
/// [`PhysicsAgent`], and exports the velocity script bindings.
pub struct PhysicsSystem2D {
    name: String,
    agent: PhysicsAgent,
    last_report: FrameReport,
}

impl PhysicsSystem2D {
    /// Hosts `provider` under the registry name `name`.
    pub fn new(
        name: impl Into<String>,
        provider: Box<dyn PhysicsProvider>,
        config: &HostConfig,
    ) -> Self {
        Self {
            name: name.into(),
            agent: PhysicsAgent::new(provider, config),
            last_report: FrameReport::default(),
        }
    }

    /// Physics backed by Rapier.
    pub fn rapier(config: &HostConfig) -> Self {
        Self::new("Rapier", Box::new(RapierPhysicsWorld::new(config.gravity())), config)
    }

    /// Physics backed by the native integrator.
    pub fn native(config: &HostConfig) -> Self {
        Self::new("Native", Box::new(NativePhysicsWorld::new(config.gravity())), config)
    }

    /// The simulation host.
    pub fn agent(&self) -> &PhysicsAgent {
        &self.agent
    }

    /// The simulation host, mutably.
    pub fn agent_mut(&mut self) -> &mut PhysicsAgent {
        &mut self.agent
    }

    /// What the last update did.
    pub fn last_report(&self) -> FrameReport {
        self.last_report
    }

    fn downcast(system: &mut dyn System) -> Option<&mut PhysicsSystem2D> {
        system.as_any_mut().downcast_mut::<PhysicsSystem2D>()
    }
}

fn script_set_velocity(
    system: &mut dyn System,
    world: &mut World,
    entity: EntityId,
    velocity: Vec2,
) -> bool {
    PhysicsSystem2D::downcast(system)
        .is_some_and(|physics| physics.agent.set_velocity(world, entity, velocity))
}

fn script_add_velocity(
    system: &mut dyn System,
    world: &mut World,
    entity: EntityId,
    delta: Vec2,
) -> bool {
    PhysicsSystem2D::downcast(system)
        .is_some_and(|physics| physics.agent.add_velocity(world, entity, delta))
}

impl System for PhysicsSystem2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn component_names(&self) -> &[&'static str] {
        &[PHYSICS_COMPONENT]
    }

    fn create_component(
        &mut self,
        world: &mut World,
        entity: EntityId,
        name: &str,
        config: &Value,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            name == PHYSICS_COMPONENT,
            "{} does not build '{name}' components",
            self.name
        );
        let layout = self.agent.provider().shape_layout();
        let body = parse_physics_body(config, layout)
            .map_err(|err| err.for_entity(entity))
            .with_context(|| format!("invalid {PHYSICS_COMPONENT} configuration"))?;
        // A rebuilt entity hands its previous body to the next update's release pass.
        if world.release_physics(entity) {
            log::debug!("{}: rebuilding physics for {entity:?}", self.name);
        }
        anyhow::ensure!(world.assign(entity, body), "entity {entity:?} does not exist");
        self.agent.instantiate(world, entity)?;
        Ok(())
    }

    fn update(&mut self, world: &mut World, frame: Duration) {
        self.last_report = self.agent.update(world, frame);
        log::trace!("{}: {:?}", self.name, self.last_report);
    }

    fn apply_setting(&mut self, key: &str, value: &SettingValue) -> bool {
        self.agent.apply_setting(key, value)
    }

    fn script_bindings(&self) -> Vec<(&'static str, ScriptFn)> {
        vec![
            (SET_VELOCITY_BINDING, script_set_velocity as ScriptFn),
            (ADD_VELOCITY_BINDING, script_add_velocity as ScriptFn),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
