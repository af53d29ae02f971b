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

//! Math types used across the bridge.
//!
//! Vectors come from `glam`; the helpers here cover the degree/radian split
//! between registry transforms (degrees) and the simulation (radians).

pub use glam::Vec2;

/// Converts an angle in degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Converts an angle in radians to degrees.
#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians.to_degrees()
}
