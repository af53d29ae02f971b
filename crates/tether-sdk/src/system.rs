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

use serde_json::Value;
use tether_core::ecs::EntityId;
use tether_core::math::Vec2;
use tether_core::SettingValue;
use tether_data::ecs::World;

/// A script-callable operation on one entity, taking a 2D vector argument.
///
/// The system argument is the system that exported the binding. Returns
/// `false` when the call did nothing.
pub type ScriptFn = fn(&mut dyn System, &mut World, EntityId, Vec2) -> bool;

/// A subsystem hosted by a [`Scene`](crate::Scene).
pub trait System: Any {
    /// Registry name of the system.
    fn name(&self) -> &str;

    /// Component names this system builds from declarative configuration.
    fn component_names(&self) -> &[&'static str];

    /// Builds the component `name` for `entity` from its configuration.
    fn create_component(
        &mut self,
        world: &mut World,
        entity: EntityId,
        name: &str,
        config: &Value,
    ) -> anyhow::Result<()>;

    /// Advances the system by one frame.
    fn update(&mut self, world: &mut World, frame: Duration);

    /// Applies a string-keyed setting. Unknown keys are ignored and return `false`.
    fn apply_setting(&mut self, key: &str, value: &SettingValue) -> bool;

    /// Operations exported to scripts, by binding name.
    fn script_bindings(&self) -> Vec<(&'static str, ScriptFn)> {
        Vec::new()
    }

    /// Upcast for downcasting to the concrete system.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete system.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
