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

use approx::assert_relative_eq;
use serde_json::json;
use tether_core::math::Vec2;
use tether_core::physics::{
    mass, BodyKind, PhysicsError, PhysicsProvider, ShapeDesc, ShapeKind, ShapeSpec,
};
use tether_data::ecs::{BodyLink, PhysicsBody, Transform2D, World};
use tether_data::scene::parse_physics_body;
use tether_infra::{NativePhysicsWorld, RapierPhysicsWorld};
use tether_lanes::physics_lane::{BodyFactory, BodyReaper, TransformWriteback};

const SCALE: f32 = 30.0;

fn providers() -> Vec<Box<dyn PhysicsProvider>> {
    vec![
        Box::new(RapierPhysicsWorld::new(Vec2::ZERO)),
        Box::new(NativePhysicsWorld::new(Vec2::ZERO)),
    ]
}

fn spawn_from(
    world: &mut World,
    provider: &dyn PhysicsProvider,
    config: serde_json::Value,
    transform: Transform2D,
) -> tether_core::ecs::EntityId {
    let body = parse_physics_body(&config, provider.shape_layout()).unwrap();
    world.spawn((transform, body))
}

fn circle_config(provider: &dyn PhysicsProvider, kind: &str) -> serde_json::Value {
    match provider.shape_layout().circle_arity() {
        3 => json!({ "type": kind, "circles": [0, 0, 10] }),
        _ => json!({ "type": kind, "circles": [1, 0.5, 0, 0, 10] }),
    }
}

#[test]
fn test_box_is_scaled_once() {
    let mut provider = NativePhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(
        &mut world,
        &provider,
        json!({ "type": "dynamic", "box": [2, 2] }),
        Transform2D::new(60.0, 90.0, 0.0),
    );

    let link = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();
    let BodyLink::Owned(handle) = link else {
        panic!("dynamic entity should own its body, got {link:?}");
    };
    assert_eq!(provider.body_position(handle), Some(Vec2::new(2.0, 3.0)));

    let body = world.get::<PhysicsBody>(entity).unwrap();
    let (geometry, _) = provider.shape(body.attached[0]).unwrap();
    match geometry {
        ShapeDesc::Box {
            half_width,
            half_height,
        } => {
            assert_relative_eq!(*half_width, 1.0 / 30.0);
            assert_relative_eq!(*half_height, 1.0 / 30.0);
        }
        other => panic!("unexpected shape {other:?}"),
    }
    // The component keeps configuration units.
    assert_eq!(
        body.shapes[0].geometry,
        ShapeDesc::Box {
            half_width: 1.0,
            half_height: 1.0
        }
    );
}

#[test]
fn test_round_trip_through_zero_time() {
    for angle in [30.0, 190.0, 270.0, -200.0, 720.0] {
        for mut provider in providers() {
            let mut world = World::new();
            let placement = Transform2D::new(120.0, -45.0, angle);
            let config = circle_config(provider.as_ref(), "dynamic");
            let entity = spawn_from(&mut world, provider.as_ref(), config, placement);

            BodyFactory::new()
                .instantiate(&mut world, entity, provider.as_mut(), SCALE)
                .unwrap();
            let outcome = TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);
            assert_eq!(outcome.synced, 1, "{}", provider.name());

            let synced = world.get::<Transform2D>(entity).unwrap();
            assert_relative_eq!(synced.x, placement.x, epsilon = 1e-3);
            assert_relative_eq!(synced.y, placement.y, epsilon = 1e-3);
            assert!(
                (synced.angle - angle).abs() < 1e-2,
                "{} turned {angle} into {}",
                provider.name(),
                synced.angle
            );
        }
    }
}

#[test]
fn test_one_step_at_rest_keeps_placement() {
    for mut provider in providers() {
        let mut world = World::new();
        let placement = Transform2D::new(300.0, 150.0, 0.0);
        let entity = spawn_from(
            &mut world,
            provider.as_ref(),
            json!({ "type": "dynamic", "box": [2, 2] }),
            placement,
        );
        BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();

        provider.step(1.0 / 60.0);
        TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);

        let synced = world.get::<Transform2D>(entity).unwrap();
        assert_relative_eq!(synced.x, 300.0, epsilon = 1e-3);
        assert_relative_eq!(synced.y, 150.0, epsilon = 1e-3);
        assert_relative_eq!(synced.angle, 0.0, epsilon = 1e-3);
    }
}

#[test]
fn test_static_entities_use_the_anchor_and_are_never_written() {
    for mut provider in providers() {
        provider.set_gravity(Vec2::new(0.0, 9.0));
        let mut world = World::new();
        let placement = Transform2D::new(30.0, 60.0, 0.0);
        let config = circle_config(provider.as_ref(), "static");
        let entity = spawn_from(&mut world, provider.as_ref(), config, placement);
        let bodies_before = provider.body_count();

        let link = BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        assert_eq!(link, BodyLink::Anchored);
        assert_eq!(provider.body_count(), bodies_before);

        let body = world.get::<PhysicsBody>(entity).unwrap();
        assert_eq!(body.body(), None);
        assert_eq!(body.attached.len(), 1);

        for _ in 0..30 {
            provider.step(1.0 / 60.0);
            let outcome = TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);
            assert_eq!(outcome.synced, 0);
            assert!(outcome.orphans.is_empty());
        }
        assert_eq!(world.get::<Transform2D>(entity), Some(placement));
    }
}

#[test]
fn test_static_shapes_keep_their_placement() {
    let mut provider = NativePhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(
        &mut world,
        &provider,
        json!({ "type": "static", "circles": [1, 1, 0, 0, 15] }),
        Transform2D::new(30.0, 60.0, 0.0),
    );
    BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();

    let body = world.get::<PhysicsBody>(entity).unwrap();
    let (geometry, _) = provider.shape(body.attached[0]).unwrap();
    assert_eq!(
        geometry,
        &ShapeDesc::Circle {
            center: Vec2::new(1.0, 2.0),
            radius: 0.5
        }
    );
}

#[test]
fn test_kinematic_entities_own_a_tagged_body() {
    for mut provider in providers() {
        let mut world = World::new();
        let config = circle_config(provider.as_ref(), "kinematic");
        let entity = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());

        let link = BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        let BodyLink::Owned(handle) = link else {
            panic!("kinematic entity should own its body");
        };
        let snapshot = provider
            .bodies()
            .into_iter()
            .find(|b| b.handle == handle)
            .unwrap();
        assert_eq!(snapshot.kind, BodyKind::Kinematic);
        assert_eq!(snapshot.tag.entity(), Some(entity));
    }
}

#[test]
fn test_instantiate_is_idempotent() {
    for mut provider in providers() {
        let mut world = World::new();
        let config = circle_config(provider.as_ref(), "dynamic");
        let entity = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());
        let factory = BodyFactory::new();

        let first = factory
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        let count = provider.body_count();
        let second = factory
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.body_count(), count);
    }
}

#[test]
fn test_failed_construction_leaves_nothing_behind() {
    for mut provider in providers() {
        let mut world = World::new();
        let broken = PhysicsBody::new(BodyKind::Dynamic)
            .with_shape(ShapeSpec::new(ShapeDesc::Circle {
                center: Vec2::ZERO,
                radius: 1.0,
            }))
            .with_shape(ShapeSpec::new(ShapeDesc::Polygon {
                vertices: vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)],
            }));
        let entity = world.spawn((Transform2D::default(), broken));
        let count = provider.body_count();

        let err = BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::Entity { entity: e, .. } if e == entity));
        assert_eq!(err.shape_kind(), Some(ShapeKind::Polygon));
        assert_eq!(provider.body_count(), count);
        assert!(!world.get::<PhysicsBody>(entity).unwrap().is_built());
    }
}

#[test]
fn test_missing_component_is_reported() {
    let mut provider = NativePhysicsWorld::default();
    let mut world = World::new();
    let entity = world.spawn((Transform2D::default(),));
    let err = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap_err();
    assert!(err.to_string().contains("PhysicsBody"), "{err}");
}

#[test]
fn test_explicit_mass_is_summed_over_shapes() {
    let mut provider = NativePhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(
        &mut world,
        &provider,
        json!({
            "segments": [1, 1, 0, 0, 60, 0],
            "circles": [2, 0.5, 30, 0, 15],
        }),
        Transform2D::default(),
    );
    let handle = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();
    let BodyLink::Owned(handle) = handle else {
        panic!("expected an owned body");
    };

    let expected_moment = mass::moment_for_segment(1.0, Vec2::ZERO, Vec2::new(2.0, 0.0), 0.0)
        + mass::moment_for_circle(2.0, 0.0, 0.5, Vec2::new(1.0, 0.0));
    assert_relative_eq!(provider.body_mass(handle).unwrap(), 3.0, epsilon = 1e-5);
    assert_relative_eq!(provider.body_moment(handle).unwrap(), expected_moment, epsilon = 1e-5);

    // Circles are attached before segments; per-shape friction wins over the body's.
    let body = world.get::<PhysicsBody>(entity).unwrap();
    let (_, material) = provider.shape(body.attached[0]).unwrap();
    assert_relative_eq!(material.friction, 0.5);
}

#[test]
fn test_explicit_body_mass_overrides_the_sum() {
    let mut provider = NativePhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(
        &mut world,
        &provider,
        json!({ "mass": 10, "circles": [2, 0.5, 0, 0, 15] }),
        Transform2D::default(),
    );
    let link = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();
    let body = link_body(link);
    assert_relative_eq!(provider.body_mass(body).unwrap(), 10.0, epsilon = 1e-5);
    assert_relative_eq!(
        provider.body_moment(body).unwrap(),
        mass::moment_for_circle(2.0, 0.0, 0.5, Vec2::ZERO),
        epsilon = 1e-5
    );
}

#[test]
fn test_massless_native_body_falls_back() {
    let mut provider = NativePhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(&mut world, &provider, json!({ "box": [30, 30] }), Transform2D::default());
    let link = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();
    let body = link_body(link);
    assert_relative_eq!(provider.body_mass(body).unwrap(), 1.0);
    assert!(provider.body_moment(body).unwrap().is_infinite());
}

#[test]
fn test_internal_mass_is_split_across_unweighted_shapes() {
    let mut provider = RapierPhysicsWorld::new(Vec2::ZERO);
    let mut world = World::new();
    let entity = spawn_from(
        &mut world,
        &provider,
        json!({ "mass": 4, "box": [30, 30], "circles": [60, 0, 15] }),
        Transform2D::default(),
    );
    let link = BodyFactory::new()
        .instantiate(&mut world, entity, &mut provider, SCALE)
        .unwrap();
    provider.step(1.0 / 60.0);
    assert_relative_eq!(provider.body_mass(link_body(link)).unwrap(), 4.0, epsilon = 1e-4);
}

#[test]
fn test_writeback_skips_entities_without_transform() {
    for mut provider in providers() {
        let mut world = World::new();
        let config = circle_config(provider.as_ref(), "dynamic");
        let entity = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());
        BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        world.remove::<Transform2D>(entity);

        let outcome = TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);
        assert_eq!(outcome.synced, 0);
        assert!(outcome.orphans.is_empty());
        assert!(!world.has::<Transform2D>(entity));
    }
}

#[test]
fn test_orphans_are_reported_and_reclaimed() {
    for mut provider in providers() {
        let mut world = World::new();
        let config = circle_config(provider.as_ref(), "dynamic");
        let entity = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());
        BodyFactory::new()
            .instantiate(&mut world, entity, provider.as_mut(), SCALE)
            .unwrap();
        let baseline = provider.body_count() - 1;

        // Dropping the component bypasses the release queue.
        world.remove::<PhysicsBody>(entity);
        let outcome = TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);
        assert_eq!(outcome.synced, 0);
        assert_eq!(outcome.orphans.len(), 1);

        let reclaimed = BodyReaper::new().reclaim(provider.as_mut(), &outcome.orphans);
        assert_eq!(reclaimed, 1);
        assert_eq!(provider.body_count(), baseline);
    }
}

#[test]
fn test_despawn_releases_owned_and_anchored_resources() {
    for mut provider in providers() {
        let mut world = World::new();
        let factory = BodyFactory::new();
        let baseline = provider.body_count();

        let config = circle_config(provider.as_ref(), "dynamic");
        let mover = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());
        let config = circle_config(provider.as_ref(), "static");
        let wall = spawn_from(&mut world, provider.as_ref(), config, Transform2D::default());
        factory
            .instantiate(&mut world, mover, provider.as_mut(), SCALE)
            .unwrap();
        factory
            .instantiate(&mut world, wall, provider.as_mut(), SCALE)
            .unwrap();

        assert!(world.despawn(mover));
        assert!(world.despawn(wall));
        // Writeback before the release still skips the dead entity.
        let outcome = TransformWriteback::new().sync(&mut world, provider.as_ref(), SCALE);
        assert_eq!(outcome.synced, 0);

        let released = BodyReaper::new().release(provider.as_mut(), world.drain_released());
        assert_eq!(released, 2);
        assert_eq!(provider.body_count(), baseline);
        assert!(provider.bodies().iter().all(|b| b.tag.is_none()));
    }
}

fn link_body(link: BodyLink) -> tether_core::physics::BodyHandle {
    match link {
        BodyLink::Owned(handle) => handle,
        other => panic!("expected an owned body, got {other:?}"),
    }
}
