//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component storage
//! - A generation counter so a recycled index never aliases an old handle

use super::component::ComponentMask;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component storage
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this entity ID is the null sentinel.
    ///
    /// A non-null ID may still be stale; only the owning
    /// [`World`](super::World) can answer `is_valid`.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Raw packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

/// One row of the registry: the current handle for a slot plus the mask of
/// component types attached to it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntitySlot {
    /// Handle currently issued for this slot (generation included).
    pub id: EntityId,
    /// Component types attached to the live entity.
    pub mask: ComponentMask,
    /// Whether the slot holds a live entity.
    pub alive: bool,
}

impl EntitySlot {
    /// A slot that has never been used. Its first occupant gets generation 0.
    pub(crate) const fn vacant(index: u32) -> Self {
        Self {
            id: EntityId::new(index, u32::MAX),
            mask: ComponentMask::EMPTY,
            alive: false,
        }
    }

    /// Claims the slot, bumping the generation.
    pub(crate) fn occupy(&mut self) -> EntityId {
        let generation = self.id.generation().wrapping_add(1);
        self.id = EntityId::new(self.id.index(), generation);
        self.mask = ComponentMask::EMPTY;
        self.alive = true;
        self.id
    }

    /// Whether `id` is the live occupant of this slot.
    #[inline]
    pub(crate) fn holds(&self, id: EntityId) -> bool {
        self.alive && self.id == id
    }
}
