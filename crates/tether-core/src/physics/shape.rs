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

use serde::{Deserialize, Serialize};

use super::mass;
use super::PhysicsError;
use crate::math::Vec2;

/// The kinds of shape a body can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Axis-aligned box around the body origin.
    Box,
    /// Convex polygon.
    Polygon,
    /// Circle, possibly offset from the body origin.
    Circle,
    /// Segment between two points, optionally rounded.
    Segment,
}

impl ShapeKind {
    /// The configuration key declaring shapes of this kind.
    pub fn config_key(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Circle => "circles",
            ShapeKind::Segment => "segments",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Supported shape geometries.
///
/// Units depend on where the value lives: configuration units inside a
/// `PhysicsBody` component, simulation units once handed to an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeDesc {
    /// Box with half-extents.
    Box {
        /// Half of the box width.
        half_width: f32,
        /// Half of the box height.
        half_height: f32,
    },
    /// Convex polygon, vertices in declaration order.
    Polygon {
        /// At least three vertices.
        vertices: Vec<Vec2>,
    },
    /// Circle.
    Circle {
        /// Centre relative to the body origin.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// Segment between two endpoints.
    Segment {
        /// First endpoint.
        a: Vec2,
        /// Second endpoint.
        b: Vec2,
        /// Rounding radius, zero for a thin segment.
        radius: f32,
    },
}

impl ShapeDesc {
    /// The kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeDesc::Box { .. } => ShapeKind::Box,
            ShapeDesc::Polygon { .. } => ShapeKind::Polygon,
            ShapeDesc::Circle { .. } => ShapeKind::Circle,
            ShapeDesc::Segment { .. } => ShapeKind::Segment,
        }
    }

    /// Divides every linear dimension by `divisor`.
    pub fn scaled(&self, divisor: f32) -> ShapeDesc {
        match self {
            ShapeDesc::Box {
                half_width,
                half_height,
            } => ShapeDesc::Box {
                half_width: half_width / divisor,
                half_height: half_height / divisor,
            },
            ShapeDesc::Polygon { vertices } => ShapeDesc::Polygon {
                vertices: vertices.iter().map(|v| *v / divisor).collect(),
            },
            ShapeDesc::Circle { center, radius } => ShapeDesc::Circle {
                center: *center / divisor,
                radius: radius / divisor,
            },
            ShapeDesc::Segment { a, b, radius } => ShapeDesc::Segment {
                a: *a / divisor,
                b: *b / divisor,
                radius: radius / divisor,
            },
        }
    }

    /// Moves the geometry from a body's local frame into the frame of a body
    /// at the origin, given the local frame's `position` and `angle` (radians).
    ///
    /// Shapes attached to the shared static body use this to keep their
    /// entity's placement. A rotated box becomes a polygon.
    pub fn placed(&self, position: Vec2, angle: f32) -> ShapeDesc {
        if position == Vec2::ZERO && angle == 0.0 {
            return self.clone();
        }
        let rotation = Vec2::from_angle(angle);
        let place = |v: Vec2| position + rotation.rotate(v);
        match self {
            ShapeDesc::Box {
                half_width,
                half_height,
            } => {
                let (w, h) = (*half_width, *half_height);
                ShapeDesc::Polygon {
                    vertices: [
                        Vec2::new(-w, -h),
                        Vec2::new(w, -h),
                        Vec2::new(w, h),
                        Vec2::new(-w, h),
                    ]
                    .into_iter()
                    .map(place)
                    .collect(),
                }
            }
            ShapeDesc::Polygon { vertices } => ShapeDesc::Polygon {
                vertices: vertices.iter().map(|v| place(*v)).collect(),
            },
            ShapeDesc::Circle { center, radius } => ShapeDesc::Circle {
                center: place(*center),
                radius: *radius,
            },
            ShapeDesc::Segment { a, b, radius } => ShapeDesc::Segment {
                a: place(*a),
                b: place(*b),
                radius: *radius,
            },
        }
    }

    /// Rejects geometry that cannot describe a solid shape.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let kind = self.kind();
        let degenerate = |reason| Err(PhysicsError::DegenerateShape { kind, reason });
        match self {
            ShapeDesc::Box {
                half_width,
                half_height,
            } => {
                if !(half_width.is_finite() && half_height.is_finite()) {
                    return degenerate("extents must be finite");
                }
                if *half_width <= 0.0 || *half_height <= 0.0 {
                    return degenerate("extents must be positive");
                }
            }
            ShapeDesc::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return degenerate("a polygon needs at least three vertices");
                }
                if !vertices.iter().all(|v| v.is_finite()) {
                    return degenerate("vertices must be finite");
                }
                if mass::polygon_area(vertices).abs() <= f32::EPSILON {
                    return degenerate("vertices enclose no area");
                }
            }
            ShapeDesc::Circle { center, radius } => {
                if !(center.is_finite() && radius.is_finite()) {
                    return degenerate("centre and radius must be finite");
                }
                if *radius <= 0.0 {
                    return degenerate("radius must be positive");
                }
            }
            ShapeDesc::Segment { a, b, radius } => {
                if !(a.is_finite() && b.is_finite() && radius.is_finite()) {
                    return degenerate("endpoints and radius must be finite");
                }
                if *radius < 0.0 {
                    return degenerate("radius must not be negative");
                }
                if a == b && *radius == 0.0 {
                    return degenerate("endpoints coincide");
                }
            }
        }
        Ok(())
    }

    /// Moment of inertia of this shape carrying `mass`, about the body origin.
    pub fn moment(&self, mass: f32) -> f32 {
        match self {
            ShapeDesc::Box {
                half_width,
                half_height,
            } => mass::moment_for_box(mass, half_width * 2.0, half_height * 2.0),
            ShapeDesc::Polygon { vertices } => mass::moment_for_polygon(mass, vertices),
            ShapeDesc::Circle { center, radius } => {
                mass::moment_for_circle(mass, 0.0, *radius, *center)
            }
            ShapeDesc::Segment { a, b, radius } => mass::moment_for_segment(mass, *a, *b, *radius),
        }
    }
}

/// One declared shape together with its own optional mass and friction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// The geometry.
    pub geometry: ShapeDesc,
    /// Mass contributed by this shape.
    pub mass: Option<f32>,
    /// Friction overriding the body-level value.
    pub friction: Option<f32>,
}

impl ShapeSpec {
    /// A shape with no mass or friction of its own.
    pub fn new(geometry: ShapeDesc) -> Self {
        Self {
            geometry,
            mass: None,
            friction: None,
        }
    }
}
