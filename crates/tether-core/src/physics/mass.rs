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

//! Moment-of-inertia formulas for engines that need explicit mass properties.
//!
//! Every moment is taken about the body origin, with geometry in simulation units.

use crate::math::Vec2;

/// Moment of a hollow circle (annulus) with radii `r1`/`r2` centred at `offset`.
pub fn moment_for_circle(mass: f32, r1: f32, r2: f32, offset: Vec2) -> f32 {
    mass * (0.5 * (r1 * r1 + r2 * r2) + offset.length_squared())
}

/// Moment of a rounded segment from `a` to `b`.
pub fn moment_for_segment(mass: f32, a: Vec2, b: Vec2, radius: f32) -> f32 {
    let offset = a.lerp(b, 0.5);
    let length = b.distance(a) + 2.0 * radius;
    mass * ((length * length + 4.0 * radius * radius) / 12.0 + offset.length_squared())
}

/// Moment of a solid box of full extents `width` x `height` centred on the origin.
pub fn moment_for_box(mass: f32, width: f32, height: f32) -> f32 {
    mass * (width * width + height * height) / 12.0
}

/// Moment of a solid polygon.
///
/// Winding order does not matter; a polygon with no area yields zero.
pub fn moment_for_polygon(mass: f32, vertices: &[Vec2]) -> f32 {
    match vertices.len() {
        0 | 1 => 0.0,
        2 => moment_for_segment(mass, vertices[0], vertices[1], 0.0),
        count => {
            let mut sum1 = 0.0;
            let mut sum2 = 0.0;
            for i in 0..count {
                let v1 = vertices[i];
                let v2 = vertices[(i + 1) % count];
                let a = v2.perp_dot(v1);
                let b = v1.dot(v1) + v1.dot(v2) + v2.dot(v2);
                sum1 += a * b;
                sum2 += a;
            }
            if sum2.abs() <= f32::EPSILON {
                0.0
            } else {
                (mass * sum1) / (6.0 * sum2)
            }
        }
    }
}

/// Signed area of a polygon, positive for counter-clockwise winding.
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    let count = vertices.len();
    if count < 3 {
        return 0.0;
    }
    (0..count)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % count]))
        .sum::<f32>()
        * 0.5
}
