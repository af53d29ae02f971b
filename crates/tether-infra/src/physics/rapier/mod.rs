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

//! Rapier implementation of the physics provider.

mod conversions;

use std::collections::HashMap;
use std::f32::consts::TAU;

use rapier2d::na::UnitComplex;
use rapier2d::parry::mass_properties::MassProperties;
use rapier2d::prelude::*;
use tether_core::math::Vec2;
use tether_core::physics::{
    BodyHandle, BodyKind, BodySnapshot, BodyTag, MassModel, PhysicsError, PhysicsProvider,
    RigidBodyDesc, ShapeDesc, ShapeHandle, ShapeLayout, ShapeMaterial,
};

use self::conversions::*;

/// Default gravity, pointing down the screen (+y).
const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 9.0);

/// Implementation of the `PhysicsProvider` trait using the Rapier2D physics engine.
///
/// Mass properties are derived by Rapier from collider density, so the body
/// factory only hands it per-shape masses. The static anchor is a fixed body
/// created together with the world.
///
/// Rapier stores rotations as unit complex numbers, which only remember the
/// angle modulo a full turn. The world keeps a running angle per body and
/// unwraps every reading around it, so angles past a half turn survive.
pub struct RapierPhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    anchor: RigidBodyHandle,
    angles: HashMap<RigidBodyHandle, f32>,
}

impl Default for RapierPhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl RapierPhysicsWorld {
    /// Creates an empty world holding only the static anchor.
    pub fn new(gravity: Vec2) -> Self {
        let mut rigid_body_set = RigidBodySet::new();
        let anchor = rigid_body_set.insert(RigidBodyBuilder::fixed().build());
        Self {
            rigid_body_set,
            collider_set: ColliderSet::new(),
            gravity: to_rapier_vec(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            anchor,
            angles: HashMap::new(),
        }
    }

    /// Total mass Rapier computed for a body, once its colliders are attached.
    pub fn body_mass(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set
            .get(to_rapier_body(handle))
            .map(|rb| rb.mass())
    }

    /// Number of colliders across every body.
    pub fn shape_count(&self) -> usize {
        self.collider_set.len()
    }

    fn angle_of(&self, handle: RigidBodyHandle, rb: &RigidBody) -> f32 {
        let wrapped = rb.rotation().angle();
        match self.angles.get(&handle) {
            Some(reference) => unwrap_angle(wrapped, *reference),
            None => wrapped,
        }
    }

    fn collider_for(shape: &ShapeDesc) -> Result<ColliderBuilder, PhysicsError> {
        let builder = match shape {
            ShapeDesc::Box {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(*half_width, *half_height),
            ShapeDesc::Polygon { vertices } => {
                let points: Vec<Point<Real>> = vertices.iter().map(|v| to_rapier_point(*v)).collect();
                // Concave outlines collapse to their hull.
                ColliderBuilder::convex_hull(&points).ok_or(PhysicsError::DegenerateShape {
                    kind: shape.kind(),
                    reason: "vertices do not form a convex hull",
                })?
            }
            ShapeDesc::Circle { center, radius } => {
                ColliderBuilder::ball(*radius).translation(to_rapier_vec(*center))
            }
            ShapeDesc::Segment { a, b, radius } if *radius > 0.0 => ColliderBuilder::new(
                SharedShape::capsule(to_rapier_point(*a), to_rapier_point(*b), *radius),
            ),
            ShapeDesc::Segment { a, b, .. } => {
                ColliderBuilder::segment(to_rapier_point(*a), to_rapier_point(*b))
            }
        };
        Ok(builder)
    }

    fn with_mass(builder: ColliderBuilder, shape: &ShapeDesc, mass: Option<f32>) -> ColliderBuilder {
        let Some(mass) = mass.filter(|m| m.is_finite() && *m > 0.0) else {
            return builder.density(1.0);
        };
        match shape {
            // A bare segment has no area for Rapier to rescale, so its mass
            // properties are given directly.
            ShapeDesc::Segment { a, b, .. } => {
                let centre = a.lerp(*b, 0.5);
                let inertia = (shape.moment(mass) - mass * centre.length_squared()).max(0.0);
                builder.mass_properties(MassProperties::new(to_rapier_point(centre), mass, inertia))
            }
            _ => builder.mass(mass),
        }
    }
}

/// The angle congruent to `wrapped` closest to `reference`.
fn unwrap_angle(wrapped: f32, reference: f32) -> f32 {
    wrapped + TAU * ((reference - wrapped) / TAU).round()
}

fn kind_to_rapier(kind: BodyKind) -> RigidBodyType {
    match kind {
        BodyKind::Dynamic => RigidBodyType::Dynamic,
        BodyKind::Static => RigidBodyType::Fixed,
        BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
    }
}

fn kind_from_rapier(body_type: RigidBodyType) -> BodyKind {
    match body_type {
        RigidBodyType::Dynamic => BodyKind::Dynamic,
        RigidBodyType::Fixed => BodyKind::Static,
        RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
            BodyKind::Kinematic
        }
    }
}

impl PhysicsProvider for RapierPhysicsWorld {
    fn name(&self) -> &'static str {
        "Rapier"
    }

    fn mass_model(&self) -> MassModel {
        MassModel::Internal
    }

    fn shape_layout(&self) -> ShapeLayout {
        ShapeLayout::Plain
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Bodies turn less than half a revolution per step.
        for (handle, reference) in self.angles.iter_mut() {
            if let Some(rb) = self.rigid_body_set.get(*handle) {
                *reference = unwrap_angle(rb.rotation().angle(), *reference);
            }
        }
    }

    fn gravity(&self) -> Vec2 {
        from_rapier_vec(&self.gravity)
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_rapier_vec(gravity);
    }

    fn static_body(&self) -> BodyHandle {
        from_rapier_body(self.anchor)
    }

    fn add_body(&mut self, desc: RigidBodyDesc) -> BodyHandle {
        let rigid_body = RigidBodyBuilder::new(kind_to_rapier(desc.kind))
            .translation(to_rapier_vec(desc.position))
            .rotation(desc.angle)
            .user_data(desc.tag.to_user_data())
            .build();

        let handle = self.rigid_body_set.insert(rigid_body);
        self.angles.insert(handle, desc.angle);
        from_rapier_body(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let rb_handle = to_rapier_body(handle);
        if rb_handle == self.anchor {
            log::warn!("RapierPhysicsWorld: the static anchor body cannot be removed");
            return false;
        }
        self.angles.remove(&rb_handle);
        self.rigid_body_set
            .remove(
                rb_handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn attach_shape(
        &mut self,
        body: BodyHandle,
        shape: &ShapeDesc,
        material: ShapeMaterial,
    ) -> Result<ShapeHandle, PhysicsError> {
        let rb_handle = to_rapier_body(body);
        if !self.rigid_body_set.contains(rb_handle) {
            return Err(PhysicsError::UnknownBody(body));
        }
        shape.validate()?;

        let collider = Self::with_mass(Self::collider_for(shape)?, shape, material.mass)
            .friction(material.friction)
            .restitution(material.restitution)
            .build();

        let handle = self
            .collider_set
            .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        Ok(from_rapier_collider(handle))
    }

    fn detach_shape(&mut self, handle: ShapeHandle) -> bool {
        self.collider_set
            .remove(
                to_rapier_collider(handle),
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            )
            .is_some()
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(to_rapier_body(handle))
            .map(|rb| from_rapier_vec(rb.translation()))
    }

    fn body_angle(&self, handle: BodyHandle) -> Option<f32> {
        let rb_handle = to_rapier_body(handle);
        self.rigid_body_set
            .get(rb_handle)
            .map(|rb| self.angle_of(rb_handle, rb))
    }

    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(to_rapier_body(handle))
            .map(|rb| from_rapier_vec(rb.linvel()))
    }

    fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        match self.rigid_body_set.get_mut(to_rapier_body(handle)) {
            Some(rb) if !rb.is_fixed() => {
                rb.set_linvel(to_rapier_vec(velocity), true);
                true
            }
            _ => false,
        }
    }

    fn set_body_transform(&mut self, handle: BodyHandle, position: Vec2, angle: f32) -> bool {
        let rb_handle = to_rapier_body(handle);
        if rb_handle == self.anchor {
            return false;
        }
        match self.rigid_body_set.get_mut(rb_handle) {
            Some(rb) => {
                rb.set_translation(to_rapier_vec(position), true);
                rb.set_rotation(UnitComplex::new(angle), true);
                self.angles.insert(rb_handle, angle);
                true
            }
            None => false,
        }
    }

    fn bodies(&self) -> Vec<BodySnapshot> {
        self.rigid_body_set
            .iter()
            .map(|(handle, rb)| BodySnapshot {
                handle: from_rapier_body(handle),
                tag: BodyTag::from_user_data(rb.user_data),
                kind: kind_from_rapier(rb.body_type()),
                position: from_rapier_vec(rb.translation()),
                angle: self.angle_of(handle, rb),
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tether_core::ecs::EntityId;

    fn material() -> ShapeMaterial {
        ShapeMaterial {
            friction: 1.0,
            restitution: 0.3,
            mass: None,
        }
    }

    fn unit_box() -> ShapeDesc {
        ShapeDesc::Box {
            half_width: 0.5,
            half_height: 0.5,
        }
    }

    #[test]
    fn test_new_world_has_only_the_anchor() {
        let world = RapierPhysicsWorld::default();
        assert_eq!(world.body_count(), 1);
        let bodies = world.bodies();
        assert_eq!(bodies[0].handle, world.static_body());
        assert_eq!(bodies[0].kind, BodyKind::Static);
        assert!(bodies[0].tag.is_none());
        assert_eq!(world.gravity(), Vec2::new(0.0, 9.0));
    }

    #[test]
    fn test_anchor_cannot_be_removed() {
        let mut world = RapierPhysicsWorld::default();
        assert!(!world.remove_body(world.static_body()));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_tag_round_trips_through_user_data() {
        let mut world = RapierPhysicsWorld::default();
        let entity = EntityId::new(7, 2);
        let mut desc = RigidBodyDesc::new(BodyKind::Dynamic);
        desc.tag = BodyTag::for_entity(entity);
        desc.position = Vec2::new(1.0, 2.0);
        let handle = world.add_body(desc);

        let snapshot = world
            .bodies()
            .into_iter()
            .find(|b| b.handle == handle)
            .unwrap();
        assert_eq!(snapshot.tag.entity(), Some(entity));
        assert_eq!(snapshot.position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_dynamic_body_falls_under_gravity() {
        let mut world = RapierPhysicsWorld::default();
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));
        world.attach_shape(body, &unit_box(), material()).unwrap();

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let position = world.body_position(body).unwrap();
        assert!(position.y > 0.0, "body should move down +y, got {position}");
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut world = RapierPhysicsWorld::default();
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));
        world.attach_shape(body, &unit_box(), material()).unwrap();
        assert!(world.remove_body(body));
        assert_eq!(world.shape_count(), 0);

        // The slot is reused under a new generation.
        let replacement = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));
        assert_ne!(replacement, body);
        assert_eq!(world.body_position(body), None);
        assert!(!world.remove_body(body));
        assert!(world.body_position(replacement).is_some());
    }

    #[test]
    fn test_attach_to_unknown_body_fails() {
        let mut world = RapierPhysicsWorld::default();
        let missing = BodyHandle::from_parts(40, 0);
        let err = world.attach_shape(missing, &unit_box(), material()).unwrap_err();
        assert_eq!(err, PhysicsError::UnknownBody(missing));
    }

    #[test]
    fn test_per_shape_mass_overrides_density() {
        let mut world = RapierPhysicsWorld::default();
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Dynamic));
        let weighted = ShapeMaterial {
            mass: Some(3.0),
            ..material()
        };
        world.attach_shape(body, &unit_box(), weighted).unwrap();
        let segment = ShapeDesc::Segment {
            a: Vec2::ZERO,
            b: Vec2::new(2.0, 0.0),
            radius: 0.0,
        };
        world.attach_shape(body, &segment, weighted).unwrap();

        // Mass properties are refreshed on the next step.
        world.step(1.0 / 60.0);
        assert_relative_eq!(world.body_mass(body).unwrap(), 6.0, epsilon = 1e-4);
    }

    #[test]
    fn test_static_shapes_detach_individually() {
        let mut world = RapierPhysicsWorld::default();
        let anchor = world.static_body();
        let first = world.attach_shape(anchor, &unit_box(), material()).unwrap();
        let second = world.attach_shape(anchor, &unit_box(), material()).unwrap();
        assert_eq!(world.shape_count(), 2);

        assert!(world.detach_shape(first));
        assert!(!world.detach_shape(first));
        assert_eq!(world.shape_count(), 1);
        assert_eq!(world.body_count(), 1);
        assert!(world.detach_shape(second));
    }

    #[test]
    fn test_velocity_and_transform() {
        let mut world = RapierPhysicsWorld::default();
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Kinematic));
        assert!(world.set_body_velocity(body, Vec2::new(6.0, 0.0)));
        assert_eq!(world.body_velocity(body), Some(Vec2::new(6.0, 0.0)));

        assert!(world.set_body_transform(body, Vec2::new(3.0, 4.0), 0.5));
        assert_eq!(world.body_position(body), Some(Vec2::new(3.0, 4.0)));
        assert_relative_eq!(world.body_angle(body).unwrap(), 0.5, epsilon = 1e-6);

        assert!(!world.set_body_velocity(world.static_body(), Vec2::ONE));
        assert!(!world.set_body_transform(world.static_body(), Vec2::ONE, 0.0));
    }

    #[test]
    fn test_angles_past_a_half_turn_are_kept() {
        let mut world = RapierPhysicsWorld::new(Vec2::ZERO);
        let mut desc = RigidBodyDesc::new(BodyKind::Dynamic);
        desc.angle = 4.7;
        let body = world.add_body(desc);
        world.attach_shape(body, &unit_box(), material()).unwrap();
        assert_relative_eq!(world.body_angle(body).unwrap(), 4.7, epsilon = 1e-5);

        assert!(world.set_body_transform(body, Vec2::ZERO, -12.5));
        let snapshot = world.bodies().into_iter().find(|b| b.handle == body).unwrap();
        assert_relative_eq!(snapshot.angle, -12.5, epsilon = 1e-4);
        world.step(1.0 / 60.0);
        assert_relative_eq!(world.body_angle(body).unwrap(), -12.5, epsilon = 1e-4);
    }

    #[test]
    fn test_spinning_body_accumulates_angle() {
        let mut world = RapierPhysicsWorld::new(Vec2::ZERO);
        let body = world.add_body(RigidBodyDesc::new(BodyKind::Kinematic));
        world
            .rigid_body_set
            .get_mut(to_rapier_body(body))
            .unwrap()
            .set_angvel(3.0, true);

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        assert_relative_eq!(world.body_angle(body).unwrap(), 6.0, epsilon = 1e-3);
    }
}
