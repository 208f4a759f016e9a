//! # Broad Phase
//!
//! Cheap rejection before any geometry is tested: the group/flag filter
//! and world-space bounding boxes.

use glam::Vec3;

use crate::narrow::SupportMap;

/// True if two objects may collide.
///
/// Each object's flags must name a group the other belongs to. The test is
/// symmetric, so a pair is either recorded on both objects or on neither.
#[inline]
#[must_use]
pub const fn passes_filter(groups_a: u32, flags_a: u32, groups_b: u32, flags_b: u32) -> bool {
    (flags_a & groups_b) != 0 && (flags_b & groups_a) != 0
}

/// Axis-Aligned Bounding Box for collision detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the box.
    pub min: Vec3,
    /// Maximum corner of the box.
    pub max: Vec3,
}

impl Aabb {
    /// A box that contains nothing; the identity for [`Aabb::union`].
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB centered at `center` with the given half extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Tight bounds of a convex shape, from six support queries.
    pub(crate) fn from_support<S: SupportMap + ?Sized>(shape: &S) -> Self {
        Self {
            min: Vec3::new(
                shape.support(Vec3::NEG_X).x,
                shape.support(Vec3::NEG_Y).y,
                shape.support(Vec3::NEG_Z).z,
            ),
            max: Vec3::new(
                shape.support(Vec3::X).x,
                shape.support(Vec3::Y).y,
                shape.support(Vec3::Z).z,
            ),
        }
    }

    /// Checks if this AABB intersects another. Touching faces count.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Returns the overlap amount on each axis. Positive = overlap, Negative = gap.
    #[must_use]
    pub fn overlap(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}
