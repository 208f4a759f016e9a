//! # Collision System
//!
//! Tests every pair of physics objects once per tick and writes the
//! results into each object's collision buffers.
//!
//! ## Pass Structure
//!
//! ```text
//! reset buffers ─> place shapes (world AABBs) ─> pairs i < j
//!                                                   │
//!                          filter ─> body AABB ─> shape AABB ─> GJK/EPA
//!                                                   │
//!                              record on A, swapped manifold on B
//! ```
//!
//! Pairs are visited in entity-index order, so an object's buffer lists
//! its partners in a stable order from tick to tick.

use glam::{Quat, Vec3};
use tessera_core::{
    ComponentStorage, EntityId, Requirements, SceneContext, System, Transform, World,
};

use crate::broad::{passes_filter, Aabb};
use crate::config::PhysicsConfig;
use crate::narrow::{contact, Convex};
use crate::object::{CollisionSink, Manifold, PhysicsObject};
use crate::shape::{PhysicsShape, ShapeKind};

/// Counters from the most recent pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Pairs considered.
    pub pairs_tested: u64,
    /// Pairs rejected by the group/flag filter.
    pub pairs_filtered: u64,
    /// Pairs that produced a manifold.
    pub pairs_overlapping: u64,
    /// Collisions lost because a buffer was full.
    pub dropped: u64,
}

/// An object taking part in this pass.
#[derive(Clone, Copy, Debug)]
struct Body {
    entity: EntityId,
    slot: usize,
    groups: u32,
    flags: u32,
    aabb: Aabb,
    first: usize,
    end: usize,
}

/// A primitive placed in world space.
#[derive(Clone, Copy, Debug)]
struct Primitive {
    shape: usize,
    child: Option<usize>,
    position: Vec3,
    rotation: Quat,
    aabb: Aabb,
}

impl Primitive {
    fn convex<'s>(&self, object: &'s PhysicsObject) -> Convex<'s> {
        let kind = &object.shapes()[self.shape].kind;
        let kind = match (kind, self.child) {
            (ShapeKind::Compound { children }, Some(child)) => &children[child].kind,
            (kind, _) => kind,
        };
        Convex {
            kind,
            position: self.position,
            rotation: self.rotation,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    a: usize,
    b: usize,
    manifold: Manifold,
}

/// Narrow-phase collision between every pair of
/// [`Transform`] + [`PhysicsObject`] entities.
///
/// Objects do not move or respond; consumers read
/// [`PhysicsObject::collision_ids`] and [`PhysicsObject::manifolds`]
/// after this system ran.
#[derive(Debug, Default)]
pub struct CollisionSystem {
    config: PhysicsConfig,
    bodies: Vec<Body>,
    primitives: Vec<Primitive>,
    contacts: Vec<Contact>,
    stats: CollisionStats,
}

impl CollisionSystem {
    /// Creates the system with narrow-phase tuning.
    #[must_use]
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Counters from the last pass.
    #[must_use]
    pub const fn stats(&self) -> CollisionStats {
        self.stats
    }

    /// Narrow-phase tuning in use.
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    fn gather(
        &mut self,
        entities: &[EntityId],
        objects: &ComponentStorage<PhysicsObject>,
        transforms: &ComponentStorage<Transform>,
    ) {
        self.bodies.clear();
        self.primitives.clear();

        for &entity in entities {
            let slot = entity.index() as usize;
            let (Some(object), Some(transform)) = (objects.get(slot), transforms.get(slot)) else {
                continue;
            };

            let first = self.primitives.len();
            let offsets_apply = object.shapes().len() > 1;
            for (index, shape) in object.shapes().iter().enumerate() {
                let (position, rotation) = if offsets_apply {
                    place(transform.position, transform.rotation, shape)
                } else {
                    (transform.position, transform.rotation)
                };

                match &shape.kind {
                    ShapeKind::Compound { children } => {
                        for (child_index, child) in children.iter().enumerate() {
                            let (position, rotation) = place(position, rotation, child);
                            self.push_primitive(object, index, Some(child_index), position, rotation);
                        }
                    }
                    _ => self.push_primitive(object, index, None, position, rotation),
                }
            }

            let end = self.primitives.len();
            let aabb = self.primitives[first..end]
                .iter()
                .fold(Aabb::EMPTY, |acc, p| acc.union(&p.aabb));
            self.bodies.push(Body {
                entity,
                slot,
                groups: object.collision_groups(),
                flags: object.collision_flags(),
                aabb,
                first,
                end,
            });
        }
    }

    fn push_primitive(
        &mut self,
        object: &PhysicsObject,
        shape: usize,
        child: Option<usize>,
        position: Vec3,
        rotation: Quat,
    ) {
        let mut primitive = Primitive {
            shape,
            child,
            position,
            rotation,
            aabb: Aabb::EMPTY,
        };
        primitive.aabb = Aabb::from_support(&primitive.convex(object));
        self.primitives.push(primitive);
    }

    fn find_contacts(&mut self, objects: &ComponentStorage<PhysicsObject>) {
        self.contacts.clear();

        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (self.bodies[i], self.bodies[j]);
                self.stats.pairs_tested += 1;

                if !passes_filter(a.groups, a.flags, b.groups, b.flags) {
                    self.stats.pairs_filtered += 1;
                    continue;
                }
                if !a.aabb.intersects(&b.aabb) {
                    continue;
                }
                if let Some(manifold) =
                    pair_manifold(&a, &b, &self.primitives, objects, &self.config)
                {
                    self.stats.pairs_overlapping += 1;
                    self.contacts.push(Contact { a: i, b: j, manifold });
                }
            }
        }
    }

    fn record(&mut self, world: &World) {
        let mut objects = world.components_mut::<PhysicsObject>();
        let mut dropped = 0;

        for contact in &self.contacts {
            let (a, b) = (self.bodies[contact.a], self.bodies[contact.b]);
            if let Some(object) = objects.get_mut(a.slot) {
                if !object.record_collision(b.entity, contact.manifold) {
                    dropped += 1;
                }
            }
            if let Some(object) = objects.get_mut(b.slot) {
                if !object.record_collision(a.entity, contact.manifold.swapped()) {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "collision buffers full, extra collisions dropped");
        }
        self.stats.dropped = dropped;
    }
}

impl System for CollisionSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new().with::<Transform>().with::<PhysicsObject>()
    }

    fn process(&mut self, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let world = ctx.world();
        self.stats = CollisionStats::default();

        {
            let mut objects = world.components_mut::<PhysicsObject>();
            for &entity in entities {
                if let Some(object) = objects.get_mut(entity.index() as usize) {
                    object.reset_collisions();
                }
            }
        }

        {
            let objects = world.components::<PhysicsObject>();
            let transforms = world.components::<Transform>();
            self.gather(entities, &objects, &transforms);
            self.find_contacts(&objects);
        }

        self.record(world);
        tracing::trace!(
            bodies = self.bodies.len(),
            tested = self.stats.pairs_tested,
            overlapping = self.stats.pairs_overlapping,
            "collision pass"
        );
    }
}

/// Applies a shape's local placement on top of a parent pose.
fn place(position: Vec3, rotation: Quat, shape: &PhysicsShape) -> (Vec3, Quat) {
    (position + rotation * shape.position, rotation * shape.rotation)
}

/// All contacts between two bodies merged into one manifold.
///
/// The normal comes from the deepest primitive pair.
fn pair_manifold(
    a: &Body,
    b: &Body,
    primitives: &[Primitive],
    objects: &ComponentStorage<PhysicsObject>,
    config: &PhysicsConfig,
) -> Option<Manifold> {
    let object_a = objects.get(a.slot)?;
    let object_b = objects.get(b.slot)?;

    let mut merged: Option<Manifold> = None;
    let mut deepest = f32::INFINITY;

    for pa in &primitives[a.first..a.end] {
        for pb in &primitives[b.first..b.end] {
            if !pa.aabb.intersects(&pb.aabb) {
                continue;
            }
            let Some(found) = contact(&pa.convex(object_a), &pb.convex(object_b), config) else {
                continue;
            };

            let out = merged.get_or_insert_with(|| Manifold::new(found.normal));
            if found.deepest() < deepest {
                deepest = found.deepest();
                out.normal = found.normal;
            }
            for &point in found.points() {
                out.insert_deepest(point, config.contact_merge_distance);
            }
        }
    }

    if let Some(manifold) = merged.as_mut() {
        manifold.sort_deepest_first();
    }
    merged
}
