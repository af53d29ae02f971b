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

use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use serde_json::Value;
use tether_agents::physics_agent::HostConfig;

use crate::{PhysicsSystem2D, System};

/// Builds a system from its JSON configuration.
pub type SystemConstructor = Box<dyn Fn(&Value) -> anyhow::Result<Box<dyn System>>>;

/// Maps system names to constructors.
///
/// Nothing registers itself: [`SystemRegistry::init`] lists the built-in
/// systems explicitly, in order.
#[derive(Default)]
pub struct SystemRegistry {
    constructors: BTreeMap<String, SystemConstructor>,
}

fn host_config(config: &Value) -> anyhow::Result<HostConfig> {
    if config.is_null() {
        return Ok(HostConfig::default());
    }
    serde_json::from_value(config.clone()).context("invalid physics host configuration")
}

impl SystemRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in systems.
    pub fn init() -> Self {
        let mut registry = Self::new();
        registry.register("Rapier", |config| {
            Ok(Box::new(PhysicsSystem2D::rapier(&host_config(config)?)))
        });
        registry.register("Native", |config| {
            Ok(Box::new(PhysicsSystem2D::native(&host_config(config)?)))
        });
        registry
    }

    /// Registers a constructor, replacing any previous one with that name.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&Value) -> anyhow::Result<Box<dyn System>> + 'static,
    {
        if self
            .constructors
            .insert(name.to_owned(), Box::new(constructor))
            .is_some()
        {
            log::warn!("SystemRegistry: replaced '{name}'");
        } else {
            log::info!("SystemRegistry: registered '{name}'");
        }
    }

    /// Builds the system registered under `name`.
    pub fn create(&self, name: &str, config: &Value) -> anyhow::Result<Box<dyn System>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| anyhow!("no system registered as '{name}'"))?;
        constructor(config).with_context(|| format!("failed to create system '{name}'"))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
