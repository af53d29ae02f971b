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

use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::{ColliderHandle, Real, RigidBodyHandle};
use tether_core::math::Vec2;
use tether_core::physics::{BodyHandle, ShapeHandle};

pub fn to_rapier_vec(v: Vec2) -> Vector2<Real> {
    Vector2::new(v.x, v.y)
}

pub fn to_rapier_point(v: Vec2) -> Point2<Real> {
    Point2::new(v.x, v.y)
}

pub fn from_rapier_vec(v: &Vector2<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

pub fn to_rapier_body(handle: BodyHandle) -> RigidBodyHandle {
    let (index, generation) = handle.parts();
    RigidBodyHandle::from_raw_parts(index, generation)
}

pub fn from_rapier_body(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle::from_parts(index, generation)
}

pub fn to_rapier_collider(handle: ShapeHandle) -> ColliderHandle {
    let (index, generation) = handle.parts();
    ColliderHandle::from_raw_parts(index, generation)
}

pub fn from_rapier_collider(handle: ColliderHandle) -> ShapeHandle {
    let (index, generation) = handle.into_raw_parts();
    ShapeHandle::from_parts(index, generation)
}
