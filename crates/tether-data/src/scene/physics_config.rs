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

//! Parsing of the declarative `physics2d` record into a [`PhysicsBody`].
//!
//! Optional fields are lenient: a missing or mistyped `type`, `friction`,
//! `restitution` or `mass` silently falls back to its default. Shape arrays
//! are strict, and a length that does not fit the shape kind is an error.

use serde_json::Value;
use tether_core::math::Vec2;
use tether_core::physics::{
    Arity, BodyKind, PhysicsError, ShapeDesc, ShapeKind, ShapeLayout, ShapeSpec, SEGMENT_ARITY,
};

use crate::ecs::{PhysicsBody, DEFAULT_FRICTION, DEFAULT_RESTITUTION};

/// Builds an unbuilt [`PhysicsBody`] from a configuration record.
///
/// Geometry stays in configuration units. Shapes are listed in the order
/// `box`, `polygon`, `circles`, `segments`.
pub fn parse_physics_body(config: &Value, layout: ShapeLayout) -> Result<PhysicsBody, PhysicsError> {
    let kind = match config.get("type").and_then(Value::as_str) {
        Some(name) => BodyKind::from_name(name).unwrap_or_else(|| {
            log::debug!("physics2d: unknown body type '{name}', using dynamic");
            BodyKind::Dynamic
        }),
        None => BodyKind::Dynamic,
    };

    let mut body = PhysicsBody {
        kind,
        friction: number_or(config, "friction", DEFAULT_FRICTION),
        restitution: number_or(config, "restitution", DEFAULT_RESTITUTION),
        mass: config.get("mass").and_then(Value::as_f64).map(|m| m as f32),
        ..Default::default()
    };

    if let Some(values) = shape_values(config, ShapeKind::Box, Arity::Exactly(2))? {
        body.shapes.push(ShapeSpec::new(ShapeDesc::Box {
            half_width: values[0] / 2.0,
            half_height: values[1] / 2.0,
        }));
    }

    if let Some(values) = shape_values(config, ShapeKind::Polygon, Arity::EvenAtLeast(6))? {
        let vertices = values.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect();
        body.shapes.push(ShapeSpec::new(ShapeDesc::Polygon { vertices }));
    }

    let circle_arity = layout.circle_arity();
    if let Some(values) = shape_values(config, ShapeKind::Circle, Arity::MultipleOf(circle_arity))? {
        for c in values.chunks_exact(circle_arity) {
            let spec = match layout {
                ShapeLayout::Plain => ShapeSpec::new(ShapeDesc::Circle {
                    center: Vec2::new(c[0], c[1]),
                    radius: c[2],
                }),
                ShapeLayout::Weighted => ShapeSpec {
                    geometry: ShapeDesc::Circle {
                        center: Vec2::new(c[2], c[3]),
                        radius: c[4],
                    },
                    mass: Some(c[0]),
                    friction: Some(c[1]),
                },
            };
            body.shapes.push(spec);
        }
    }

    if let Some(values) = shape_values(config, ShapeKind::Segment, Arity::MultipleOf(SEGMENT_ARITY))? {
        for s in values.chunks_exact(SEGMENT_ARITY) {
            body.shapes.push(ShapeSpec {
                geometry: ShapeDesc::Segment {
                    a: Vec2::new(s[2], s[3]),
                    b: Vec2::new(s[4], s[5]),
                    radius: 0.0,
                },
                mass: Some(s[0]),
                friction: Some(s[1]),
            });
        }
    }

    for shape in &body.shapes {
        shape.geometry.validate()?;
    }

    Ok(body)
}

fn number_or(config: &Value, key: &str, default: f32) -> f32 {
    config
        .get(key)
        .and_then(Value::as_f64)
        .map_or(default, |v| v as f32)
}

/// Reads the numeric array declared for `kind`, if there is one.
///
/// A key holding something other than an array is treated as absent.
fn shape_values(
    config: &Value,
    kind: ShapeKind,
    arity: Arity,
) -> Result<Option<Vec<f32>>, PhysicsError> {
    let Some(array) = config.get(kind.config_key()).and_then(Value::as_array) else {
        return Ok(None);
    };

    let values = array
        .iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_f64()
                .map(|n| n as f32)
                .ok_or(PhysicsError::NonNumericGeometry { kind, index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !arity.accepts(values.len()) {
        return Err(PhysicsError::GeometryArity {
            kind,
            expected: arity,
            found: values.len(),
        });
    }
    Ok(Some(values))
}
