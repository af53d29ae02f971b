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
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_core::SettingValue;
use tether_data::ecs::Transform2D;

/// A system to create, with its configuration and initial settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDefinition {
    /// Registry name.
    pub name: String,
    /// Construction-time configuration.
    #[serde(default)]
    pub config: Value,
    /// Settings applied right after construction.
    #[serde(default)]
    pub settings: BTreeMap<String, SettingValue>,
}

/// An entity to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Optional lookup name.
    #[serde(default)]
    pub name: Option<String>,
    /// Initial placement.
    #[serde(default)]
    pub transform: Option<Transform2D>,
    /// Declarative components, keyed by component name.
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

/// The JSON description of a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Systems, created in order.
    #[serde(default)]
    pub systems: Vec<SystemDefinition>,
    /// Entities, spawned in order.
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

impl SceneDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("malformed scene definition")
    }

    /// Reads and parses a definition file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in scene file {}", path.display()))
    }
}
