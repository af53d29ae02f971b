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

use serde::{Deserialize, Serialize};
use tether_core::ecs::EntityId;
use tether_core::physics::{BodyHandle, BodyKind, ShapeHandle, ShapeSpec};

/// Friction applied when the configuration gives none.
pub const DEFAULT_FRICTION: f32 = 1.0;

/// Restitution applied when the configuration gives none.
pub const DEFAULT_RESTITUTION: f32 = 0.3;

/// How a [`PhysicsBody`] is tied to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyLink {
    /// Nothing has been built yet.
    #[default]
    Unbuilt,
    /// The entity owns this simulation body, which carries its tag.
    Owned(BodyHandle),
    /// The shapes were attached to the engine's static body.
    Anchored,
}

/// Component describing the simulated body of an entity.
///
/// Shapes are kept in configuration units; the body factory converts them to
/// simulation units once, when it builds the body. The simulation world owns
/// the body itself and this component only refers to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    /// Body kind.
    pub kind: BodyKind,
    /// Friction for shapes that declare none of their own.
    pub friction: f32,
    /// Restitution (bounciness) coefficient.
    pub restitution: f32,
    /// Explicit total mass, overriding whatever the shapes add up to.
    pub mass: Option<f32>,
    /// Declared shapes, in declaration order.
    pub shapes: Vec<ShapeSpec>,
    /// The simulation body, once built.
    #[serde(skip)]
    pub link: BodyLink,
    /// Shapes attached in the simulation, in declaration order.
    #[serde(skip)]
    pub attached: Vec<ShapeHandle>,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
            mass: None,
            shapes: Vec::new(),
            link: BodyLink::Unbuilt,
            attached: Vec::new(),
        }
    }
}

impl PhysicsBody {
    /// Creates an unbuilt body of the given kind with default material.
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Adds a shape.
    pub fn with_shape(mut self, shape: ShapeSpec) -> Self {
        self.shapes.push(shape);
        self
    }

    /// The owned simulation body, if any.
    ///
    /// Static bodies never report one: their shapes live on the shared static body.
    pub fn body(&self) -> Option<BodyHandle> {
        match self.link {
            BodyLink::Owned(handle) => Some(handle),
            _ => None,
        }
    }

    /// Whether the factory has built this body.
    pub fn is_built(&self) -> bool {
        self.link != BodyLink::Unbuilt
    }

    /// What has to be released from the simulation when `entity` goes away.
    pub fn release_record(&self, entity: EntityId) -> Option<ReleasedBody> {
        match self.link {
            BodyLink::Unbuilt => None,
            BodyLink::Owned(handle) => Some(ReleasedBody {
                entity,
                body: Some(handle),
                shapes: Vec::new(),
            }),
            BodyLink::Anchored => Some(ReleasedBody {
                entity,
                body: None,
                shapes: self.attached.clone(),
            }),
        }
    }
}

/// Simulation resources left behind by a despawned entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedBody {
    /// The entity that was despawned.
    pub entity: EntityId,
    /// Its own body, removed together with every shape on it.
    pub body: Option<BodyHandle>,
    /// Shapes it had attached to the static body.
    pub shapes: Vec<ShapeHandle>,
}
