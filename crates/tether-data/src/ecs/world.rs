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

use hecs::{Component, DynamicBundle, Entity};
use tether_core::ecs::EntityId;

use super::{BodyLink, PhysicsBody, ReleasedBody};

fn to_hecs(entity: EntityId) -> Option<Entity> {
    Entity::from_bits(entity.to_bits())
}

fn from_hecs(entity: Entity) -> EntityId {
    EntityId::from_bits(entity.to_bits().get())
}

/// The registry holding every entity and its components.
///
/// Besides plain component access it records, on [`World::despawn`], the
/// simulation resources of any entity that carried a built [`PhysicsBody`].
/// The simulation host drains those records with [`World::drain_released`].
#[derive(Default)]
pub struct World {
    inner: hecs::World,
    released: Vec<ReleasedBody>,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity with the given component bundle.
    pub fn spawn(&mut self, components: impl DynamicBundle) -> EntityId {
        from_hecs(self.inner.spawn(components))
    }

    /// Removes an entity and all its components.
    ///
    /// If the entity owned simulation resources they are queued for release.
    /// The queue is only emptied by [`World::drain_released`], which the
    /// physics host calls at the start of every update; a world that built
    /// bodies but is no longer driven by a host must drain it itself.
    /// Returns `true` if the entity existed.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(handle) = to_hecs(entity) else {
            return false;
        };
        let record = self
            .inner
            .get::<&PhysicsBody>(handle)
            .ok()
            .and_then(|body| body.release_record(entity));
        if let Some(record) = record {
            log::debug!("World: queued physics release for {entity:?}");
            self.released.push(record);
        }
        self.inner.despawn(handle).is_ok()
    }

    /// Whether the entity is alive.
    pub fn contains(&self, entity: EntityId) -> bool {
        to_hecs(entity).is_some_and(|handle| self.inner.contains(handle))
    }

    /// Whether the entity is alive and carries a `T`.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        to_hecs(entity)
            .and_then(|handle| self.inner.entity(handle).ok())
            .is_some_and(|e| e.has::<T>())
    }

    /// Returns a copy of the entity's `T`.
    pub fn get<T: Component + Clone>(&self, entity: EntityId) -> Option<T> {
        let handle = to_hecs(entity)?;
        self.inner
            .get::<&T>(handle)
            .ok()
            .map(|component| (*component).clone())
    }

    /// Borrows the entity's `T`.
    pub fn get_ref<T: Component>(&self, entity: EntityId) -> Option<hecs::Ref<'_, T>> {
        let handle = to_hecs(entity)?;
        self.inner.get::<&T>(handle).ok()
    }

    /// Borrows the entity's `T` mutably.
    pub fn get_mut<T: Component>(&self, entity: EntityId) -> Option<hecs::RefMut<'_, T>> {
        let handle = to_hecs(entity)?;
        self.inner.get::<&mut T>(handle).ok()
    }

    /// Overwrites an existing `T`.
    ///
    /// Returns `false`, leaving the entity untouched, when it has no `T`.
    pub fn replace<T: Component>(&mut self, entity: EntityId, value: T) -> bool {
        match self.get_mut::<T>(entity) {
            Some(mut component) => {
                *component = value;
                true
            }
            None => false,
        }
    }

    /// Adds or overwrites the entity's `T`.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn assign<T: Component>(&mut self, entity: EntityId, value: T) -> bool {
        to_hecs(entity).is_some_and(|handle| self.inner.insert_one(handle, value).is_ok())
    }

    /// Removes and returns the entity's `T`.
    ///
    /// This does not queue any physics release, even for a [`PhysicsBody`].
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let handle = to_hecs(entity)?;
        self.inner.remove_one::<T>(handle).ok()
    }

    /// Queues the simulation resources of the entity's built [`PhysicsBody`]
    /// for release and marks the component unbuilt.
    ///
    /// Returns `true` if anything was queued.
    pub fn release_physics(&mut self, entity: EntityId) -> bool {
        let record = self.get_mut::<PhysicsBody>(entity).and_then(|mut body| {
            let record = body.release_record(entity);
            body.link = BodyLink::Unbuilt;
            body.attached.clear();
            record
        });
        match record {
            Some(record) => {
                log::debug!("World: queued physics release for {entity:?}");
                self.released.push(record);
                true
            }
            None => false,
        }
    }

    /// Takes every release record queued since the last call.
    pub fn drain_released(&mut self) -> Vec<ReleasedBody> {
        std::mem::take(&mut self.released)
    }

    /// Number of release records waiting to be drained.
    pub fn pending_releases(&self) -> usize {
        self.released.len()
    }

    /// Returns every live entity.
    pub fn entities(&self) -> Vec<EntityId> {
        self.inner.iter().map(|e| from_hecs(e.entity())).collect()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.inner.len() as usize
    }

    /// Whether the world has no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{BodyLink, Transform2D};
    use tether_core::physics::{BodyHandle, BodyKind, ShapeHandle};

    #[test]
    fn test_replace_requires_existing_component() {
        let mut world = World::new();
        let entity = world.spawn((Transform2D::new(1.0, 2.0, 3.0),));

        assert!(world.replace(entity, Transform2D::new(4.0, 5.0, 6.0)));
        assert_eq!(world.get::<Transform2D>(entity), Some(Transform2D::new(4.0, 5.0, 6.0)));

        let bare = world.spawn(());
        assert!(!world.replace(bare, Transform2D::default()));
        assert!(!world.has::<Transform2D>(bare));
    }

    #[test]
    fn test_assign_creates_or_overwrites() {
        let mut world = World::new();
        let entity = world.spawn(());

        assert!(world.assign(entity, Transform2D::new(1.0, 1.0, 0.0)));
        assert!(world.assign(entity, Transform2D::new(2.0, 2.0, 0.0)));
        assert_eq!(world.get::<Transform2D>(entity), Some(Transform2D::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_stale_ids_are_not_alive() {
        let mut world = World::new();
        let entity = world.spawn((Transform2D::default(),));
        assert!(world.despawn(entity));

        assert!(!world.contains(entity));
        assert!(!world.has::<Transform2D>(entity));
        assert!(!world.assign(entity, Transform2D::default()));
        assert!(!world.despawn(entity));
        assert!(world.is_empty());
    }

    #[test]
    fn test_despawn_queues_owned_body() {
        let mut world = World::new();
        let mut body = PhysicsBody::new(BodyKind::Dynamic);
        body.link = BodyLink::Owned(BodyHandle::from_parts(3, 1));
        let entity = world.spawn((Transform2D::default(), body));

        world.despawn(entity);

        let released = world.drain_released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].entity, entity);
        assert_eq!(released[0].body, Some(BodyHandle::from_parts(3, 1)));
        assert_eq!(world.pending_releases(), 0);
    }

    #[test]
    fn test_despawn_queues_anchored_shapes() {
        let mut world = World::new();
        let mut body = PhysicsBody::new(BodyKind::Static);
        body.link = BodyLink::Anchored;
        body.attached = vec![ShapeHandle::from_parts(0, 1), ShapeHandle::from_parts(1, 1)];
        let entity = world.spawn((body,));

        world.despawn(entity);

        let released = world.drain_released();
        assert_eq!(released[0].body, None);
        assert_eq!(released[0].shapes.len(), 2);
    }

    #[test]
    fn test_unbuilt_and_removed_bodies_queue_nothing() {
        let mut world = World::new();
        let unbuilt = world.spawn((PhysicsBody::default(),));
        world.despawn(unbuilt);

        let mut body = PhysicsBody::default();
        body.link = BodyLink::Owned(BodyHandle::from_parts(1, 1));
        let stripped = world.spawn((body,));
        assert!(world.remove::<PhysicsBody>(stripped).is_some());
        world.despawn(stripped);

        assert!(world.drain_released().is_empty());
    }

    #[test]
    fn test_release_physics_unbuilds_the_component() {
        let mut world = World::new();
        let mut body = PhysicsBody::new(BodyKind::Dynamic);
        body.link = BodyLink::Owned(BodyHandle::from_parts(5, 2));
        let entity = world.spawn((body,));

        assert!(world.release_physics(entity));
        assert!(!world.release_physics(entity));

        let body = world.get::<PhysicsBody>(entity).unwrap();
        assert_eq!(body.link, BodyLink::Unbuilt);
        assert!(body.attached.is_empty());
        let released = world.drain_released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].body, Some(BodyHandle::from_parts(5, 2)));

        world.despawn(entity);
        assert_eq!(world.pending_releases(), 0);
    }

    #[test]
    fn test_world_without_built_bodies_never_queues() {
        let mut world = World::new();
        for i in 0..64 {
            let entity = world.spawn((
                Transform2D::new(i as f32, 0.0, 0.0),
                PhysicsBody::new(BodyKind::Dynamic),
            ));
            assert!(!world.release_physics(entity));
            world.despawn(entity);
        }
        assert_eq!(world.pending_releases(), 0);
    }
}
