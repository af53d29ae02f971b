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

use tether_core::ecs::EntityId;
use tether_core::math::deg_to_rad;
use tether_core::physics::{
    BodyKind, BodyTag, MassModel, PhysicsError, PhysicsProvider, RigidBodyDesc, ShapeDesc,
    ShapeHandle, ShapeMaterial,
};
use tether_data::ecs::{BodyLink, PhysicsBody, Transform2D, World};

/// Builds simulation bodies from [`PhysicsBody`] components.
#[derive(Debug, Default)]
pub struct BodyFactory;

/// Shape geometry in simulation units with the material it is attached with.
struct PreparedShape {
    geometry: ShapeDesc,
    material: ShapeMaterial,
}

impl BodyFactory {
    /// Creates a new `BodyFactory`.
    pub fn new() -> Self {
        Self
    }

    /// Builds the simulation body for `entity` and records it on its component.
    ///
    /// Geometry and the entity's placement are divided by `scale_factor`.
    /// Dynamic and kinematic entities get their own tagged body; static ones
    /// attach their shapes to the provider's static body and carry no tag.
    /// An entity whose body is already built is left as it is.
    ///
    /// On failure nothing is left behind in the simulation and the component
    /// stays unbuilt.
    pub fn instantiate(
        &self,
        world: &mut World,
        entity: EntityId,
        provider: &mut dyn PhysicsProvider,
        scale_factor: f32,
    ) -> Result<BodyLink, PhysicsError> {
        self.build(world, entity, provider, scale_factor)
            .map_err(|err| err.for_entity(entity))
    }

    fn build(
        &self,
        world: &mut World,
        entity: EntityId,
        provider: &mut dyn PhysicsProvider,
        scale_factor: f32,
    ) -> Result<BodyLink, PhysicsError> {
        let body = world
            .get::<PhysicsBody>(entity)
            .ok_or(PhysicsError::MissingComponent {
                entity,
                component: "PhysicsBody",
            })?;
        if body.is_built() {
            return Ok(body.link);
        }

        let transform = world.get::<Transform2D>(entity).unwrap_or_default();
        let position = transform.position() / scale_factor;
        let angle = deg_to_rad(transform.angle);

        // 1. Scale geometry once and validate it before touching the engine.
        let mut shapes = self.prepare_shapes(&body, provider.mass_model(), scale_factor);
        for shape in &shapes {
            shape.geometry.validate()?;
        }

        // 2. Resolve the body the shapes go on.
        let (link, target) = match body.kind {
            BodyKind::Static => {
                for shape in &mut shapes {
                    shape.geometry = shape.geometry.placed(position, angle);
                }
                (BodyLink::Anchored, provider.static_body())
            }
            BodyKind::Dynamic | BodyKind::Kinematic => {
                let mut desc = RigidBodyDesc::new(body.kind);
                desc.position = position;
                desc.angle = angle;
                desc.tag = BodyTag::for_entity(entity);
                if provider.mass_model() == MassModel::Explicit {
                    let (mass, moment) = self.explicit_mass(&body, &shapes);
                    desc.mass = mass;
                    desc.moment = Some(moment);
                }
                let handle = provider.add_body(desc);
                (BodyLink::Owned(handle), handle)
            }
        };

        // 3. Attach every shape, undoing the partial work on failure.
        let mut attached: Vec<ShapeHandle> = Vec::with_capacity(shapes.len());
        for shape in &shapes {
            match provider.attach_shape(target, &shape.geometry, shape.material) {
                Ok(handle) => attached.push(handle),
                Err(err) => {
                    match link {
                        BodyLink::Owned(handle) => {
                            provider.remove_body(handle);
                        }
                        _ => {
                            for handle in attached {
                                provider.detach_shape(handle);
                            }
                        }
                    }
                    return Err(err);
                }
            }
        }

        // 4. Record the link on the component.
        if let Some(mut component) = world.get_mut::<PhysicsBody>(entity) {
            component.link = link;
            component.attached = attached;
        }
        log::debug!(
            "BodyFactory: built {:?} body for {entity:?} with {} shape(s)",
            body.kind,
            shapes.len()
        );
        Ok(link)
    }

    fn prepare_shapes(
        &self,
        body: &PhysicsBody,
        mass_model: MassModel,
        scale_factor: f32,
    ) -> Vec<PreparedShape> {
        // Engines that derive mass themselves receive an explicit body mass
        // spread over the shapes that declare none.
        let share = match (mass_model, body.mass) {
            (MassModel::Internal, Some(mass)) => {
                let unweighted = body.shapes.iter().filter(|s| s.mass.is_none()).count();
                (unweighted > 0).then(|| mass / unweighted as f32)
            }
            _ => None,
        };

        body.shapes
            .iter()
            .map(|spec| PreparedShape {
                geometry: spec.geometry.scaled(scale_factor),
                material: ShapeMaterial {
                    friction: spec.friction.unwrap_or(body.friction),
                    restitution: body.restitution,
                    mass: spec.mass.or(share),
                },
            })
            .collect()
    }

    /// Total mass and moment of inertia summed over the shapes in
    /// declaration order. An explicit body mass replaces the derived total.
    fn explicit_mass(&self, body: &PhysicsBody, shapes: &[PreparedShape]) -> (Option<f32>, f32) {
        let mut total_mass = 0.0;
        let mut moment = 0.0;
        for shape in shapes {
            if let Some(mass) = shape.material.mass {
                total_mass += mass;
                moment += shape.geometry.moment(mass);
            }
        }
        let mass = body.mass.or((total_mass > 0.0).then_some(total_mass));
        (mass, moment)
    }
}
