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

//! # Physics Abstractions
//!
//! The contract every simulation engine binding implements, together with the
//! descriptors the body factory hands to it.

mod error;
pub mod mass;
mod shape;
mod tag;

pub use error::*;
pub use shape::*;
pub use tag::*;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Opaque handle to a rigid body in the physics engine.
///
/// Carries both the slot index and its generation so a handle to a removed
/// body never aliases a body created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Opaque handle to a shape attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub u64);

macro_rules! impl_handle_parts {
    ($handle:ty) => {
        impl $handle {
            /// Packs an index and a generation into a handle.
            pub const fn from_parts(index: u32, generation: u32) -> Self {
                Self(((generation as u64) << 32) | index as u64)
            }

            /// Returns the `(index, generation)` pair packed in this handle.
            pub const fn parts(self) -> (u32, u32) {
                (self.0 as u32, (self.0 >> 32) as u32)
            }
        }
    };
}

impl_handle_parts!(BodyHandle);
impl_handle_parts!(ShapeHandle);

/// Defines the kind of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Responds to forces and collisions.
    #[default]
    Dynamic,
    /// Fixed in place, does not move.
    Static,
    /// Moved by its velocity only, not by forces.
    Kinematic,
}

impl BodyKind {
    /// Parses the case-sensitive configuration name of a body kind.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dynamic" => Some(BodyKind::Dynamic),
            "static" => Some(BodyKind::Static),
            "kinematic" => Some(BodyKind::Kinematic),
            _ => None,
        }
    }

    /// Whether bodies of this kind report their motion back to the registry.
    pub fn reports_motion(self) -> bool {
        !matches!(self, BodyKind::Static)
    }
}

/// How an engine obtains the mass properties of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassModel {
    /// The engine derives mass and inertia from its shapes.
    Internal,
    /// The caller supplies total mass and moment of inertia at creation.
    Explicit,
}

/// Tuple layout of the shape arrays in declarative configuration.
///
/// `box`, `polygon` and `segments` are laid out identically for every engine;
/// only the `circles` tuple differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeLayout {
    /// `circles` are `[cx, cy, r]` triples.
    Plain,
    /// `circles` are `[mass, friction, cx, cy, r]` quintuples.
    Weighted,
}

impl ShapeLayout {
    /// Number of values per circle in this layout.
    pub fn circle_arity(self) -> usize {
        match self {
            ShapeLayout::Plain => 3,
            ShapeLayout::Weighted => 5,
        }
    }
}

/// Number of values per segment: `[mass, friction, ax, ay, bx, by]`.
pub const SEGMENT_ARITY: usize = 6;

/// Description for creating a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyDesc {
    /// Body kind.
    pub kind: BodyKind,
    /// Initial position, in simulation units.
    pub position: Vec2,
    /// Initial orientation, in radians.
    pub angle: f32,
    /// Total mass. Required by [`MassModel::Explicit`] engines, an override otherwise.
    pub mass: Option<f32>,
    /// Moment of inertia, used by [`MassModel::Explicit`] engines.
    pub moment: Option<f32>,
    /// Owning entity, written into the body once at creation.
    pub tag: BodyTag,
}

impl RigidBodyDesc {
    /// A body of the given kind at the origin with no owner.
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            angle: 0.0,
            mass: None,
            moment: None,
            tag: BodyTag::NONE,
        }
    }
}

/// Material applied to one attached shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMaterial {
    /// Friction coefficient.
    pub friction: f32,
    /// Restitution (bounciness) coefficient.
    pub restitution: f32,
    /// Mass carried by this shape, if the engine should use it.
    pub mass: Option<f32>,
}

/// The state of one live body, as reported by [`PhysicsProvider::bodies`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    /// The body.
    pub handle: BodyHandle,
    /// The tag written at creation.
    pub tag: BodyTag,
    /// Body kind.
    pub kind: BodyKind,
    /// Position in simulation units.
    pub position: Vec2,
    /// Orientation in radians.
    pub angle: f32,
}

/// Interface contract for any 2D physics engine binding.
///
/// The solver itself (broad phase, narrow phase, constraints) stays behind this
/// trait. Accessors return `None`/`false` for handles that are not live.
pub trait PhysicsProvider: Send {
    /// A short name identifying the binding in logs.
    fn name(&self) -> &'static str;

    /// How this engine obtains mass properties.
    fn mass_model(&self) -> MassModel;

    /// The configuration layout this engine's shape arrays follow.
    fn shape_layout(&self) -> ShapeLayout;

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Returns the global gravity vector.
    fn gravity(&self) -> Vec2;

    /// Sets the global gravity vector.
    fn set_gravity(&mut self, gravity: Vec2);

    /// The singleton static body every static shape is attached to.
    fn static_body(&self) -> BodyHandle;

    /// Adds a rigid body to the simulation.
    fn add_body(&mut self, desc: RigidBodyDesc) -> BodyHandle;

    /// Removes a rigid body and every shape attached to it.
    ///
    /// The static body cannot be removed.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Attaches a shape, already in simulation units, to a body.
    fn attach_shape(
        &mut self,
        body: BodyHandle,
        shape: &ShapeDesc,
        material: ShapeMaterial,
    ) -> Result<ShapeHandle, PhysicsError>;

    /// Detaches a single shape.
    fn detach_shape(&mut self, handle: ShapeHandle) -> bool;

    /// Position of a body in simulation units.
    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Orientation of a body in radians.
    fn body_angle(&self, handle: BodyHandle) -> Option<f32>;

    /// Linear velocity of a body in simulation units per second.
    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Overwrites the linear velocity of a body.
    fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool;

    /// Moves a body to a new position and orientation.
    fn set_body_transform(&mut self, handle: BodyHandle, position: Vec2, angle: f32) -> bool;

    /// Snapshots every live body together with its tag.
    fn bodies(&self) -> Vec<BodySnapshot>;

    /// Number of live bodies, the static body included.
    fn body_count(&self) -> usize;
}
