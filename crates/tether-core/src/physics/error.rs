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

use std::fmt;

use thiserror::Error;

use super::{BodyHandle, ShapeKind};
use crate::ecs::EntityId;

/// Expected length of a shape array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many values.
    Exactly(usize),
    /// Any multiple of this tuple size.
    MultipleOf(usize),
    /// An even count no smaller than this.
    EvenAtLeast(usize),
}

impl Arity {
    /// Whether `len` values satisfy this arity.
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Arity::Exactly(n) => len == n,
            Arity::MultipleOf(n) => n > 0 && len % n == 0,
            Arity::EvenAtLeast(n) => len % 2 == 0 && len >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n} values"),
            Arity::MultipleOf(n) => write!(f, "a multiple of {n} values"),
            Arity::EvenAtLeast(n) => write!(f, "an even count of at least {n} values"),
        }
    }
}

/// Errors raised while building or addressing simulation bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A shape array's length does not fit its shape kind.
    #[error("`{kind}` array has {found} values, expected {expected}")]
    GeometryArity {
        /// The offending shape array.
        kind: ShapeKind,
        /// What the layout requires.
        expected: Arity,
        /// How many values were declared.
        found: usize,
    },
    /// A shape array contains something other than a number.
    #[error("`{kind}` array has a non-numeric value at index {index}")]
    NonNumericGeometry {
        /// The offending shape array.
        kind: ShapeKind,
        /// Position of the first bad value.
        index: usize,
    },
    /// The geometry is well-formed but cannot describe a solid shape.
    #[error("degenerate {kind} shape: {reason}")]
    DegenerateShape {
        /// The offending shape kind.
        kind: ShapeKind,
        /// Why the shape was rejected.
        reason: &'static str,
    },
    /// The handle does not refer to a live body.
    #[error("body {0:?} does not exist in the simulation")]
    UnknownBody(BodyHandle),
    /// A required component is missing from the entity.
    #[error("entity {entity:?} has no {component} component")]
    MissingComponent {
        /// The entity that was addressed.
        entity: EntityId,
        /// Name of the missing component.
        component: &'static str,
    },
    /// Any of the above, reported against the entity being constructed.
    #[error("physics construction failed for entity {entity:?}: {source}")]
    Entity {
        /// The entity whose construction was aborted.
        entity: EntityId,
        /// The underlying failure.
        #[source]
        source: Box<PhysicsError>,
    },
}

impl PhysicsError {
    /// Attaches the offending entity to this error.
    pub fn for_entity(self, entity: EntityId) -> Self {
        match self {
            PhysicsError::Entity { .. } => self,
            other => PhysicsError::Entity {
                entity,
                source: Box::new(other),
            },
        }
    }

    /// The shape kind involved, if this error is about geometry.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            PhysicsError::GeometryArity { kind, .. }
            | PhysicsError::NonNumericGeometry { kind, .. }
            | PhysicsError::DegenerateShape { kind, .. } => Some(*kind),
            PhysicsError::Entity { source, .. } => source.shape_kind(),
            _ => None,
        }
    }
}
