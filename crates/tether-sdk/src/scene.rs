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

//! The `Scene` facade: one registry, the systems acting on it, and the
//! lookup tables that route components, scripts, and settings to them.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde_json::Value;
use tether_core::ecs::EntityId;
use tether_core::math::Vec2;
use tether_core::SettingValue;
use tether_data::ecs::{Transform2D, World};

use crate::{SceneDefinition, ScriptFn, System, SystemRegistry};

struct ScriptBinding {
    system: usize,
    call: ScriptFn,
}

/// A running scene.
///
/// Systems are updated in the order they were added. Each component name and
/// script binding belongs to the first system that declares it.
#[derive(Default)]
pub struct Scene {
    world: World,
    systems: Vec<Box<dyn System>>,
    components: HashMap<String, usize>,
    scripts: HashMap<String, ScriptBinding>,
    names: HashMap<String, EntityId>,
}

impl Scene {
    /// Creates an empty scene with no systems.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scene from its definition.
    ///
    /// Unknown systems and invalid system configuration are errors. An entity
    /// whose component fails to build is logged and kept without it.
    pub fn from_definition(
        definition: &SceneDefinition,
        registry: &SystemRegistry,
    ) -> anyhow::Result<Self> {
        let mut scene = Self::new();

        for system_def in &definition.systems {
            let system = registry.create(&system_def.name, &system_def.config)?;
            let index = scene.add_system(system);
            for (key, value) in &system_def.settings {
                if !scene.systems[index].apply_setting(key, value) {
                    log::warn!(
                        "Scene: setting '{key}' had no effect on {}",
                        system_def.name
                    );
                }
            }
        }

        for entity_def in &definition.entities {
            let entity = scene.spawn(entity_def.transform);
            if let Some(name) = &entity_def.name {
                scene.names.insert(name.clone(), entity);
            }
            for (component, config) in &entity_def.components {
                if let Err(err) = scene.attach_component(entity, component, config) {
                    log::warn!("Scene: {component} skipped for {entity:?}: {err:#}");
                }
            }
        }

        log::info!(
            "Scene: loaded {} systems and {} entities",
            scene.systems.len(),
            scene.world.len()
        );
        Ok(scene)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Systems
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a system, routing its components and script bindings to it.
    ///
    /// Returns the system's index.
    pub fn add_system(&mut self, system: Box<dyn System>) -> usize {
        let index = self.systems.len();
        for name in system.component_names() {
            self.components.entry((*name).to_owned()).or_insert(index);
        }
        for (name, call) in system.script_bindings() {
            self.scripts
                .entry(name.to_owned())
                .or_insert(ScriptBinding { system: index, call });
        }
        self.systems.push(system);
        index
    }

    /// Finds a system by name.
    pub fn system(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Finds a system by name and downcasts it.
    pub fn system_as<T: System>(&self, name: &str) -> Option<&T> {
        self.system(name)?.as_any().downcast_ref::<T>()
    }

    /// Applies a setting to the system called `system`.
    ///
    /// Returns whether the system recognized the setting.
    pub fn setting(
        &mut self,
        system: &str,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> anyhow::Result<bool> {
        let target = self
            .systems
            .iter_mut()
            .find(|s| s.name() == system)
            .ok_or_else(|| anyhow!("no system named '{system}' in the scene"))?;
        Ok(target.apply_setting(key, &value.into()))
    }

    /// Advances every system by one frame.
    pub fn update(&mut self, frame: Duration) {
        for system in &mut self.systems {
            system.update(&mut self.world, frame);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entities
    // ─────────────────────────────────────────────────────────────────────

    /// Spawns an entity, optionally placed.
    pub fn spawn(&mut self, transform: Option<Transform2D>) -> EntityId {
        match transform {
            Some(transform) => self.world.spawn((transform,)),
            None => self.world.spawn(()),
        }
    }

    /// Builds a declarative component on an entity through its owning system.
    pub fn attach_component(
        &mut self,
        entity: EntityId,
        name: &str,
        config: &Value,
    ) -> anyhow::Result<()> {
        let index = *self
            .components
            .get(name)
            .ok_or_else(|| anyhow!("no system builds '{name}' components"))?;
        self.systems[index]
            .create_component(&mut self.world, entity, name, config)
            .with_context(|| format!("failed to build '{name}' for {entity:?}"))
    }

    /// Despawns an entity, releasing its simulation resources on the next update.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.names.retain(|_, e| *e != entity);
        self.world.despawn(entity)
    }

    /// Looks up an entity by its definition name.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Named entities, in no particular order.
    pub fn named_entities(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.names.iter().map(|(name, entity)| (name.as_str(), *entity))
    }

    /// The entity registry.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The entity registry, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scripting
    // ─────────────────────────────────────────────────────────────────────

    /// Calls a script binding such as `"Entity.setVelocity"` on an entity.
    ///
    /// Unknown bindings and calls on entities the binding cannot act on do
    /// nothing and return `false`.
    pub fn call_script(&mut self, binding: &str, entity: EntityId, value: Vec2) -> bool {
        let Some(script) = self.scripts.get(binding) else {
            log::debug!("Scene: no script binding '{binding}'");
            return false;
        };
        let system = self.systems[script.system].as_mut();
        (script.call)(system, &mut self.world, entity, value)
    }

    /// Names of every exported script binding.
    pub fn script_bindings(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }
}
