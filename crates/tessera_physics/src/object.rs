//! # Physics Object
//!
//! The collision component: up to [`MAX_SHAPES`] shapes, group/flag masks
//! and the per-tick collision buffers the [`CollisionSystem`] fills.
//!
//! [`CollisionSystem`]: crate::CollisionSystem

use glam::Vec3;
use tessera_core::{Component, EntityId};

use crate::error::{PhysicsResult, ShapeError};
use crate::shape::PhysicsShape;

/// Shapes a single object may carry.
pub const MAX_SHAPES: usize = 10;
/// Contact points kept per manifold.
pub const MAX_MANIFOLD_POINTS: usize = 4;
/// Collisions recorded per object per tick. Further ones are dropped.
pub const MAX_COLLISIONS: usize = 100;

/// One contact between two objects.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManifoldPoint {
    /// Contact point on this object, world space.
    pub world_point_a: Vec3,
    /// Contact point on the other object, world space.
    pub world_point_b: Vec3,
    /// Signed separation along the normal; negative while penetrating.
    pub distance: f32,
}

impl ManifoldPoint {
    /// The same contact seen from the other object.
    #[inline]
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            world_point_a: self.world_point_b,
            world_point_b: self.world_point_a,
            distance: self.distance,
        }
    }
}

/// Contact points describing one colliding pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Manifold {
    point_count: usize,
    points: [ManifoldPoint; MAX_MANIFOLD_POINTS],
    /// Unit normal pointing from this object towards the other.
    pub normal: Vec3,
}

impl Manifold {
    /// An empty manifold with the given normal.
    #[must_use]
    pub fn new(normal: Vec3) -> Self {
        Self {
            normal,
            ..Self::default()
        }
    }

    /// Appends a point. Returns `false` once the manifold is full.
    pub fn push(&mut self, point: ManifoldPoint) -> bool {
        if self.point_count == MAX_MANIFOLD_POINTS {
            return false;
        }
        self.points[self.point_count] = point;
        self.point_count += 1;
        true
    }

    /// Number of valid points.
    #[inline]
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.point_count
    }

    /// The valid points, deepest first.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[ManifoldPoint] {
        &self.points[..self.point_count]
    }

    /// Most negative separation, or zero if empty.
    #[must_use]
    pub fn deepest(&self) -> f32 {
        self.points()
            .iter()
            .map(|p| p.distance)
            .fold(0.0, f32::min)
    }

    /// Adds `point` unless it duplicates one already held, keeping the
    /// deepest points once full.
    ///
    /// Points whose `world_point_a` lie within `merge_distance` of each
    /// other count as one; the deeper survives.
    pub(crate) fn insert_deepest(&mut self, point: ManifoldPoint, merge_distance: f32) {
        let merge_sq = merge_distance * merge_distance;
        let count = self.point_count;
        if let Some(existing) = self.points[..count]
            .iter_mut()
            .find(|p| p.world_point_a.distance_squared(point.world_point_a) <= merge_sq)
        {
            if point.distance < existing.distance {
                *existing = point;
            }
            return;
        }

        if self.push(point) {
            return;
        }
        let shallowest = self.points[..count]
            .iter_mut()
            .max_by(|a, b| a.distance.total_cmp(&b.distance));
        if let Some(shallowest) = shallowest {
            if point.distance < shallowest.distance {
                *shallowest = point;
            }
        }
    }

    /// Orders points from most to least penetrating.
    pub(crate) fn sort_deepest_first(&mut self) {
        self.points[..self.point_count].sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    /// The same manifold seen from the other object.
    #[must_use]
    pub fn swapped(&self) -> Self {
        let mut out = Self::new(-self.normal);
        for point in self.points() {
            out.push(point.swapped());
        }
        out
    }
}

/// Collision component.
///
/// ```rust,ignore
/// let mut body = PhysicsObject::new(1.0, 1.0);
/// body.add_shape(PhysicsShape::sphere(0.5))?;
/// body.set_collision_groups(groups::PLAYER);
/// body.set_collision_flags(groups::NPC | groups::PICKUP);
/// world.add_component(entity, body);
///
/// // after the collision system ran this tick
/// let body = world.component::<PhysicsObject>(entity);
/// for (&other, manifold) in body.collision_ids().iter().zip(body.manifolds()) {
///     // ...
/// }
/// ```
///
/// The buffers are rewritten by every collision pass; read them in the
/// same tick, after the collision system.
#[derive(Clone, Debug)]
pub struct PhysicsObject {
    mass: f32,
    density: f32,
    groups: u32,
    flags: u32,
    shapes: Vec<PhysicsShape>,
    collision_ids: Box<[EntityId]>,
    manifolds: Box<[Manifold]>,
    collision_count: usize,
}

impl Component for PhysicsObject {}

impl Default for PhysicsObject {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl PhysicsObject {
    /// Creates an object with no shapes and empty masks.
    ///
    /// Mass and density are carried for consumers; collision ignores them.
    #[must_use]
    pub fn new(mass: f32, density: f32) -> Self {
        Self {
            mass,
            density,
            groups: 0,
            flags: 0,
            shapes: Vec::with_capacity(MAX_SHAPES),
            collision_ids: vec![EntityId::NULL; MAX_COLLISIONS].into_boxed_slice(),
            manifolds: vec![Manifold::default(); MAX_COLLISIONS].into_boxed_slice(),
            collision_count: 0,
        }
    }

    /// Adds a validated shape.
    ///
    /// # Errors
    ///
    /// [`ShapeError::TooManyShapes`] past [`MAX_SHAPES`], or the validation error.
    pub fn add_shape(&mut self, shape: PhysicsShape) -> PhysicsResult<()> {
        if self.shapes.len() == MAX_SHAPES {
            return Err(ShapeError::TooManyShapes { max: MAX_SHAPES });
        }
        shape.validate()?;
        self.shapes.push(shape);
        Ok(())
    }

    /// Builder form of [`PhysicsObject::add_shape`].
    ///
    /// # Errors
    ///
    /// Same as [`PhysicsObject::add_shape`].
    pub fn with_shape(mut self, shape: PhysicsShape) -> PhysicsResult<Self> {
        self.add_shape(shape)?;
        Ok(self)
    }

    /// Attached shapes.
    #[inline]
    #[must_use]
    pub fn shapes(&self) -> &[PhysicsShape] {
        &self.shapes
    }

    /// Groups this object belongs to.
    #[inline]
    pub fn set_collision_groups(&mut self, groups: u32) {
        self.groups = groups;
    }

    /// Groups this object collides with.
    #[inline]
    pub fn set_collision_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    /// Groups this object belongs to.
    #[inline]
    #[must_use]
    pub const fn collision_groups(&self) -> u32 {
        self.groups
    }

    /// Groups this object collides with.
    #[inline]
    #[must_use]
    pub const fn collision_flags(&self) -> u32 {
        self.flags
    }

    /// Mass in kilograms.
    #[inline]
    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    /// Density.
    #[inline]
    #[must_use]
    pub const fn density(&self) -> f32 {
        self.density
    }

    /// Collisions recorded by the last pass.
    #[inline]
    #[must_use]
    pub const fn collision_count(&self) -> usize {
        self.collision_count
    }

    /// Partners recorded by the last pass.
    #[inline]
    #[must_use]
    pub fn collision_ids(&self) -> &[EntityId] {
        &self.collision_ids[..self.collision_count]
    }

    /// Manifolds recorded by the last pass, parallel to `collision_ids`.
    #[inline]
    #[must_use]
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds[..self.collision_count]
    }

    /// True if the last pass recorded a collision with `other`.
    #[must_use]
    pub fn is_colliding_with(&self, other: EntityId) -> bool {
        self.collision_ids().contains(&other)
    }
}

/// Write access to the collision buffers, for the collision system only.
pub(crate) trait CollisionSink {
    /// Forgets the previous pass.
    fn reset_collisions(&mut self);

    /// Records a collision. Returns `false` if the buffer is full.
    fn record_collision(&mut self, other: EntityId, manifold: Manifold) -> bool;
}

impl CollisionSink for PhysicsObject {
    fn reset_collisions(&mut self) {
        self.collision_count = 0;
    }

    fn record_collision(&mut self, other: EntityId, manifold: Manifold) -> bool {
        if self.collision_count == MAX_COLLISIONS {
            return false;
        }
        self.collision_ids[self.collision_count] = other;
        self.manifolds[self.collision_count] = manifold;
        self.collision_count += 1;
        true
    }
}
