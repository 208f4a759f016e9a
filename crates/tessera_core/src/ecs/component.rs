//! # Component System
//!
//! Components are plain data with no behaviour. Each component type is
//! assigned one bit of a [`ComponentMask`] the first time a world sees it.

use glam::{Quat, Vec3};

/// Marker trait for ECS components.
///
/// Any `'static` data type can be a component once it opts in:
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default)]
/// struct Health(f32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Sized + 'static {}

/// Bitset of component types (up to 64 per world).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// Mask with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Mask with a single bit set.
    #[inline]
    #[must_use]
    pub const fn bit(bit: u8) -> Self {
        Self(1 << bit)
    }

    /// Union of two masks.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Removes the bits of `other`.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// True if every bit of `required` is present.
    #[inline]
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// True if no bits are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the set bit positions, lowest first.
    pub fn bits(self) -> impl Iterator<Item = u8> {
        let mut remaining = self.0;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let bit = remaining.trailing_zeros() as u8;
            remaining &= remaining - 1;
            Some(bit)
        })
    }
}

/// World-space pose of an entity.
///
/// Consumed by movement systems and by the collision system, which places
/// every physics shape relative to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position in world space.
    pub position: Vec3,
    /// Orientation in world space.
    pub rotation: Quat,
    /// Non-uniform scale. Collision ignores it; shapes carry their own extents.
    pub scale: Vec3,
}

impl Component for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an unrotated transform at `position`.
    #[inline]
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Maps a point from local space into world space (rotation + translation).
    #[inline]
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Moves the transform by `delta`.
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

/// Linear velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// Displacement per second.
    pub linear: Vec3,
}

impl Component for Velocity {}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// Tag matched by command dispatch.
///
/// A command reaches an entity when `command.target_flags & flags != 0`.
/// Entities without this component are never reached by a command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandTarget {
    /// Bitmask of command groups this entity answers to.
    pub flags: u32,
}

impl Component for CommandTarget {}

impl CommandTarget {
    /// Creates a tag with the given flags.
    #[inline]
    #[must_use]
    pub const fn new(flags: u32) -> Self {
        Self { flags }
    }
}
