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

//! # Native Integrator
//!
//! A self-contained point-mass integrator that takes mass and moment of
//! inertia explicitly, the way constraint-based 2D engines do. It integrates
//! motion only; contact resolution is left to a full engine binding.

mod slab;

use tether_core::math::Vec2;
use tether_core::physics::{
    BodyHandle, BodyKind, BodySnapshot, BodyTag, MassModel, PhysicsError, PhysicsProvider,
    RigidBodyDesc, ShapeDesc, ShapeHandle, ShapeLayout, ShapeMaterial,
};

use self::slab::Slab;

/// Mass given to dynamic bodies created without a usable one.
pub const FALLBACK_MASS: f32 = 1.0;

const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 9.0);

/// State of one simulated body.
#[derive(Debug, Clone)]
struct NativeBody {
    kind: BodyKind,
    tag: BodyTag,
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    /// Zero for static and kinematic bodies.
    inv_mass: f32,
    /// Zero when rotation is locked.
    inv_moment: f32,
    shapes: Vec<ShapeHandle>,
}

#[derive(Debug, Clone)]
struct NativeShape {
    body: BodyHandle,
    geometry: ShapeDesc,
    material: ShapeMaterial,
}

/// Implementation of the `PhysicsProvider` trait with semi-implicit Euler
/// integration and explicit mass properties.
pub struct NativePhysicsWorld {
    bodies: Slab<NativeBody>,
    shapes: Slab<NativeShape>,
    gravity: Vec2,
    anchor: BodyHandle,
}

impl Default for NativePhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

fn to_key(handle: BodyHandle) -> (u32, u32) {
    handle.parts()
}

fn resolve_inverse(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v > 0.0).map(f32::recip)
}

impl NativePhysicsWorld {
    /// Creates an empty world holding only the static anchor.
    pub fn new(gravity: Vec2) -> Self {
        let mut bodies = Slab::default();
        let (index, generation) = bodies.insert(NativeBody {
            kind: BodyKind::Static,
            tag: BodyTag::NONE,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inv_mass: 0.0,
            inv_moment: 0.0,
            shapes: Vec::new(),
        });
        Self {
            bodies,
            shapes: Slab::default(),
            gravity,
            anchor: BodyHandle::from_parts(index, generation),
        }
    }

    /// Mass of a body, `None` for unknown handles and infinite for non-dynamic bodies.
    pub fn body_mass(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(to_key(handle)).map(|b| b.inv_mass.recip())
    }

    /// Moment of inertia of a body, infinite when rotation is locked.
    pub fn body_moment(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(to_key(handle)).map(|b| b.inv_moment.recip())
    }

    /// Geometry and material of an attached shape.
    pub fn shape(&self, handle: ShapeHandle) -> Option<(&ShapeDesc, &ShapeMaterial)> {
        self.shapes
            .get(handle.parts())
            .map(|s| (&s.geometry, &s.material))
    }

    /// Number of shapes across every body.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

impl PhysicsProvider for NativePhysicsWorld {
    fn name(&self) -> &'static str {
        "Native"
    }

    fn mass_model(&self) -> MassModel {
        MassModel::Explicit
    }

    fn shape_layout(&self) -> ShapeLayout {
        ShapeLayout::Weighted
    }

    fn step(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.iter_mut() {
            match body.kind {
                BodyKind::Static => continue,
                BodyKind::Dynamic => {
                    // Velocity first, then position from the new velocity.
                    body.linear_velocity += gravity * dt;
                    if body.inv_moment == 0.0 {
                        body.angular_velocity = 0.0;
                    }
                }
                BodyKind::Kinematic => {}
            }
            body.position += body.linear_velocity * dt;
            body.angle += body.angular_velocity * dt;
        }
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn static_body(&self) -> BodyHandle {
        self.anchor
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> BodyHandle {
        let (inv_mass, inv_moment) = match desc.kind {
            BodyKind::Dynamic => (
                resolve_inverse(desc.mass).unwrap_or(FALLBACK_MASS.recip()),
                resolve_inverse(desc.moment).unwrap_or(0.0),
            ),
            BodyKind::Static | BodyKind::Kinematic => (0.0, 0.0),
        };

        let (index, generation) = self.bodies.insert(NativeBody {
            kind: desc.kind,
            tag: desc.tag,
            position: desc.position,
            angle: desc.angle,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inv_mass,
            inv_moment,
            shapes: Vec::new(),
        });
        BodyHandle::from_parts(index, generation)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if handle == self.anchor {
            log::warn!("NativePhysicsWorld: the static anchor body cannot be removed");
            return false;
        }
        match self.bodies.remove(to_key(handle)) {
            Some(body) => {
                for shape in body.shapes {
                    self.shapes.remove(shape.parts());
                }
                true
            }
            None => false,
        }
    }

    fn attach_shape(
        &mut self,
        body: BodyHandle,
        shape: &ShapeDesc,
        material: ShapeMaterial,
    ) -> Result<ShapeHandle, PhysicsError> {
        if self.bodies.get(to_key(body)).is_none() {
            return Err(PhysicsError::UnknownBody(body));
        }
        shape.validate()?;

        let (index, generation) = self.shapes.insert(NativeShape {
            body,
            geometry: shape.clone(),
            material,
        });
        let handle = ShapeHandle::from_parts(index, generation);
        if let Some(owner) = self.bodies.get_mut(to_key(body)) {
            owner.shapes.push(handle);
        }
        Ok(handle)
    }

    fn detach_shape(&mut self, handle: ShapeHandle) -> bool {
        let Some(shape) = self.shapes.remove(handle.parts()) else {
            return false;
        };
        if let Some(owner) = self.bodies.get_mut(to_key(shape.body)) {
            owner.shapes.retain(|s| *s != handle);
        }
        true
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(to_key(handle)).map(|b| b.position)
    }

    fn body_angle(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(to_key(handle)).map(|b| b.angle)
    }

    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(to_key(handle)).map(|b| b.linear_velocity)
    }

    fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        match self.bodies.get_mut(to_key(handle)) {
            Some(body) if body.kind != BodyKind::Static => {
                body.linear_velocity = velocity;
                true
            }
            _ => false,
        }
    }

    fn set_body_transform(&mut self, handle: BodyHandle, position: Vec2, angle: f32) -> bool {
        if handle == self.anchor {
            return false;
        }
        match self.bodies.get_mut(to_key(handle)) {
            Some(body) => {
                body.position = position;
                body.angle = angle;
                true
            }
            None => false,
        }
    }

    fn bodies(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|((index, generation), body)| BodySnapshot {
                handle: BodyHandle::from_parts(index, generation),
                tag: body.tag,
                kind: body.kind,
                position: body.position,
                angle: body.angle,
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tether_core::ecs::EntityId;

    fn circle() -> ShapeDesc {
        ShapeDesc::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
        }
    }

    fn material() -> ShapeMaterial {
        ShapeMaterial {
            friction: 1.0,
            restitution: 0.3,
            mass: Some(1.0),
        }
    }

    #[test]
    fn test_semi_implicit_euler_under_gravity() {
        let mut world = NativePhysicsWorld::new(Vec2::new(0.0, 10.0));
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));

        world.step(0.5);
        // v = 5, x = v * dt after the velocity update.
        assert_eq!(world.body_velocity(body), Some(Vec2::new(0.0, 5.0)));
        assert_eq!(world.body_position(body), Some(Vec2::new(0.0, 2.5)));

        world.step(0.5);
        assert_eq!(world.body_position(body), Some(Vec2::new(0.0, 7.5)));
    }

    #[test]
    fn test_kinematic_ignores_gravity_and_static_never_moves() {
        let mut world = NativePhysicsWorld::default();
        let kinematic = world.add_body(RigidBodyDesc::new(BodyKind::Kinematic));
        let fixed = world.add_body(RigidBodyDesc::new(BodyKind::Static));
        assert!(world.set_body_velocity(kinematic, Vec2::new(2.0, 0.0)));
        assert!(!world.set_body_velocity(fixed, Vec2::new(2.0, 0.0)));

        world.step(1.0);
        assert_eq!(world.body_position(kinematic), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(world.body_position(fixed), Some(Vec2::ZERO));
        assert_eq!(world.body_position(world.static_body()), Some(Vec2::ZERO));
    }

    #[test]
    fn test_mass_fallback_and_locked_rotation() {
        let mut world = NativePhysicsWorld::default();
        let mut desc = RigidBodyDesc::new(BodyKind::Dynamic);
        desc.mass = Some(0.0);
        desc.moment = Some(-2.0);
        let body = world.add_body(desc);
        assert_relative_eq!(world.body_mass(body).unwrap(), FALLBACK_MASS);
        assert!(world.body_moment(body).unwrap().is_infinite());

        let mut weighted = RigidBodyDesc::new(BodyKind::Dynamic);
        weighted.mass = Some(4.0);
        weighted.moment = Some(8.0);
        let body = world.add_body(weighted);
        assert_relative_eq!(world.body_mass(body).unwrap(), 4.0);
        assert_relative_eq!(world.body_moment(body).unwrap(), 8.0);
    }

    #[test]
    fn test_remove_body_takes_its_shapes() {
        let mut world = NativePhysicsWorld::default();
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));
        let shape = world.attach_shape(body, &circle(), material()).unwrap();
        world.attach_shape(body, &circle(), material()).unwrap();
        assert_eq!(world.shape_count(), 2);

        assert!(world.remove_body(body));
        assert_eq!(world.shape_count(), 0);
        assert!(!world.detach_shape(shape));
        assert!(!world.remove_body(body));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_anchor_is_permanent() {
        let mut world = NativePhysicsWorld::default();
        let anchor = world.static_body();
        let shape = world.attach_shape(anchor, &circle(), material()).unwrap();
        let (geometry, stored) = world.shape(shape).unwrap();
        assert_eq!(geometry, &circle());
        assert_eq!(stored.mass, Some(1.0));
        assert!(!world.remove_body(anchor));
        assert!(world.detach_shape(shape));
        assert_eq!(world.shape_count(), 0);
        assert_eq!(world.bodies()[0].handle, anchor);
        assert!(world.bodies()[0].tag.is_none());
    }

    #[test]
    fn test_tags_are_reported_in_snapshots() {
        let mut world = NativePhysicsWorld::default();
        let entity = EntityId::new(3, 9);
        let mut desc = RigidBodyDesc::new(BodyKind::Dynamic);
        desc.tag = BodyTag::for_entity(entity);
        let body = world.add_body(desc);
        let snapshot = world
            .bodies()
            .into_iter()
            .find(|b| b.handle == body)
            .unwrap();
        assert_eq!(snapshot.tag.entity(), Some(entity));
        assert_eq!(snapshot.kind, BodyKind::Dynamic);
    }

    #[test]
    fn test_degenerate_and_unknown_targets_are_rejected() {
        let mut world = NativePhysicsWorld::default();
        let stale = BodyHandle::from_parts(99, 0);
        assert_eq!(
            world.attach_shape(stale, &circle(), material()).unwrap_err(),
            PhysicsError::UnknownBody(stale)
        );
        let flat = ShapeDesc::Circle {
            center: Vec2::ZERO,
            radius: 0.0,
        };
        assert!(world
            .attach_shape(world.static_body(), &flat, material())
            .is_err());
    }
}
