//! # ECS World
//!
//! The registry behind a scene: entity slots, one storage per component
//! type, and a structure version the scheduler uses to refresh each
//! system's matching entities.

use std::any::{type_name, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

use super::component::{Component, ComponentMask};
use super::entity::{EntityId, EntitySlot};
use super::storage::{AnyStorage, ComponentStorage};
use crate::error::{AccessError, CoreResult};

/// Maximum number of component types a single world can register.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// The ECS World - entity registry plus component storage.
///
/// Entity slots and every component storage are allocated up front for a
/// fixed capacity. Storages sit behind `RefCell`s so a system can hold a
/// mutable view of one component type while reading another.
///
/// # Handle contract
///
/// Accessors come in two flavours. `get`/`get_mut` return `Option` and are
/// what gameplay code should use after checking [`World::is_valid`].
/// `try_component` reports *why* an access failed ([`AccessError::StaleHandle`]
/// versus [`AccessError::MissingComponent`]), and `component` panics with
/// that reason: using a stale handle there is a caller bug.
///
/// ```rust,ignore
/// let mut world = World::new(1024);
/// let e = world.create();
/// world.add_component(e, Transform::default());
/// assert!(world.has_component::<Transform>(e));
/// ```
pub struct World {
    /// All entity slots (pre-allocated).
    slots: Box<[EntitySlot]>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// One storage per registered component type, indexed by mask bit.
    storages: Vec<RefCell<Box<dyn AnyStorage>>>,
    /// Component type to mask bit.
    type_bits: HashMap<TypeId, u8>,
    /// Bumped whenever an entity's component set changes.
    structure_version: u64,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let slots = (0..capacity as u32)
            .map(EntitySlot::vacant)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        // Reversed so the lowest index is handed out first
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            free_indices,
            alive_count: 0,
            storages: Vec::with_capacity(MAX_COMPONENT_TYPES),
            type_bits: HashMap::new(),
            structure_version: 0,
        }
    }

    /// Returns the maximum capacity of this world.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Version counter for entity membership.
    ///
    /// Changes on create, destroy and component add/remove. Component
    /// *mutation* does not change it.
    #[inline]
    #[must_use]
    pub const fn structure_version(&self) -> u64 {
        self.structure_version
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity, returning its ID.
    ///
    /// Returns [`EntityId::NULL`] if the world is full.
    pub fn create(&mut self) -> EntityId {
        let Some(index) = self.free_indices.pop() else {
            tracing::warn!(capacity = self.capacity(), "entity capacity exhausted");
            return EntityId::NULL;
        };

        let id = self.slots[index as usize].occupy();
        self.alive_count += 1;
        self.structure_version += 1;
        id
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// Returns `false` if the ID was null, stale or already destroyed.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.is_valid(id) {
            return false;
        }

        let index = id.index() as usize;
        let slot = &mut self.slots[index];
        let mask = slot.mask;
        slot.alive = false;
        slot.mask = ComponentMask::EMPTY;

        for bit in mask.bits() {
            if let Some(cell) = self.storages.get_mut(bit as usize) {
                cell.get_mut().remove_slot(index);
            }
        }

        self.free_indices.push(id.index());
        self.alive_count -= 1;
        self.structure_version += 1;
        true
    }

    /// Checks if a handle refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.holds(id))
    }

    /// Returns the live handle at a slot index, if any.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, index: usize) -> Option<EntityId> {
        self.slots
            .get(index)
            .filter(|slot| slot.alive)
            .map(|slot| slot.id)
    }

    /// Returns the component mask of a live entity.
    #[inline]
    #[must_use]
    pub fn mask(&self, id: EntityId) -> Option<ComponentMask> {
        if !self.is_valid(id) {
            return None;
        }
        Some(self.slots[id.index() as usize].mask)
    }

    /// Iterates over all live entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter(|s| s.alive).map(|s| s.id)
    }

    /// Collects every live entity whose mask contains `required`, in index order.
    ///
    /// `out` is cleared first; its allocation is reused.
    pub fn matching(&self, required: ComponentMask, out: &mut Vec<EntityId>) {
        out.clear();
        out.extend(
            self.slots
                .iter()
                .filter(|s| s.alive && s.mask.contains(required))
                .map(|s| s.id),
        );
    }

    // =========================================================================
    // Component types
    // =========================================================================

    /// Registers a component type, returning its mask bit.
    ///
    /// Registering an already known type is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when more than [`MAX_COMPONENT_TYPES`] types are registered.
    pub fn register<C: Component>(&mut self) -> ComponentMask {
        if let Some(&bit) = self.type_bits.get(&TypeId::of::<C>()) {
            return ComponentMask::bit(bit);
        }

        let bit = self.storages.len();
        assert!(
            bit < MAX_COMPONENT_TYPES,
            "a world supports at most {MAX_COMPONENT_TYPES} component types"
        );

        let storage: Box<dyn AnyStorage> = Box::new(ComponentStorage::<C>::new(self.capacity()));
        self.storages.push(RefCell::new(storage));
        self.type_bits.insert(TypeId::of::<C>(), bit as u8);
        tracing::debug!(component = type_name::<C>(), bit, "registered component type");

        ComponentMask::bit(bit as u8)
    }

    /// Mask bit of a registered component type.
    #[must_use]
    pub fn mask_of<C: Component>(&self) -> Option<ComponentMask> {
        self.type_bits
            .get(&TypeId::of::<C>())
            .map(|&bit| ComponentMask::bit(bit))
    }

    /// Names of every registered component type, in bit order.
    pub fn registered_components(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storages.iter().filter_map(|cell| {
            cell.try_borrow()
                .ok()
                .map(|storage| storage.component_name())
        })
    }

    // =========================================================================
    // Per-entity component access
    // =========================================================================

    /// Attaches (or replaces) a component.
    ///
    /// Registers the type on first use. Returns `false` for a stale handle.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> bool {
        if !self.is_valid(id) {
            tracing::debug!(?id, component = type_name::<C>(), "add_component on stale handle");
            return false;
        }

        let bit = self.register::<C>();
        let index = id.index() as usize;
        let Some(storage) = self.storage_mut_direct::<C>() else {
            return false;
        };
        storage.insert(index, component);

        let slot = &mut self.slots[index];
        if !slot.mask.contains(bit) {
            slot.mask = slot.mask.with(bit);
            self.structure_version += 1;
        }
        true
    }

    /// Detaches a component, handing it back.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        if !self.is_valid(id) {
            return None;
        }

        let bit = self.mask_of::<C>()?;
        let index = id.index() as usize;
        let removed = self.storage_mut_direct::<C>()?.remove(index);

        let slot = &mut self.slots[index];
        if slot.mask.contains(bit) {
            slot.mask = slot.mask.without(bit);
            self.structure_version += 1;
        }
        removed
    }

    /// True if the entity is alive and carries a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        match (self.mask(id), self.mask_of::<C>()) {
            (Some(mask), Some(bit)) => mask.contains(bit),
            _ => false,
        }
    }

    /// Borrows a component, reporting why the access failed.
    ///
    /// # Errors
    ///
    /// [`AccessError::StaleHandle`] if the handle is dead,
    /// [`AccessError::MissingComponent`] if the entity lacks `C`,
    /// [`AccessError::BorrowConflict`] if the storage is mutably borrowed.
    pub fn try_component<C: Component>(&self, id: EntityId) -> CoreResult<Ref<'_, C>> {
        let index = self.check_handle(id)?;
        let storage = self
            .try_components::<C>()
            .map_err(|e| missing_if_unregistered::<C>(e, id))?;
        Ref::filter_map(storage, |s| s.get(index)).map_err(|_| AccessError::MissingComponent {
            entity: id,
            component: type_name::<C>(),
        })
    }

    /// Mutably borrows a component, reporting why the access failed.
    ///
    /// # Errors
    ///
    /// Same as [`World::try_component`].
    pub fn try_component_mut<C: Component>(&self, id: EntityId) -> CoreResult<RefMut<'_, C>> {
        let index = self.check_handle(id)?;
        let storage = self
            .try_components_mut::<C>()
            .map_err(|e| missing_if_unregistered::<C>(e, id))?;
        RefMut::filter_map(storage, |s| s.get_mut(index)).map_err(|_| {
            AccessError::MissingComponent {
                entity: id,
                component: type_name::<C>(),
            }
        })
    }

    /// Borrows a component if the handle is live and the component present.
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<Ref<'_, C>> {
        self.try_component(id).ok()
    }

    /// Mutably borrows a component if the handle is live and the component present.
    #[must_use]
    pub fn get_mut<C: Component>(&self, id: EntityId) -> Option<RefMut<'_, C>> {
        self.try_component_mut(id).ok()
    }

    /// Borrows a component the caller knows is there.
    ///
    /// # Panics
    ///
    /// Panics with the [`AccessError`] describing the violation.
    #[must_use]
    pub fn component<C: Component>(&self, id: EntityId) -> Ref<'_, C> {
        self.try_component(id).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Mutably borrows a component the caller knows is there.
    ///
    /// # Panics
    ///
    /// Panics with the [`AccessError`] describing the violation.
    #[must_use]
    pub fn component_mut<C: Component>(&self, id: EntityId) -> RefMut<'_, C> {
        self.try_component_mut(id).unwrap_or_else(|e| panic!("{e}"))
    }

    // =========================================================================
    // Whole-storage access (system iteration)
    // =========================================================================

    /// Borrows the whole storage of `C`.
    ///
    /// # Errors
    ///
    /// [`AccessError::Unregistered`] or [`AccessError::BorrowConflict`].
    pub fn try_components<C: Component>(&self) -> CoreResult<Ref<'_, ComponentStorage<C>>> {
        let cell = self.storage_cell::<C>()?;
        let guard = cell
            .try_borrow()
            .map_err(|_| AccessError::BorrowConflict(type_name::<C>()))?;
        Ref::filter_map(guard, |s| s.storage_any().downcast_ref::<ComponentStorage<C>>())
            .map_err(|_| AccessError::Unregistered(type_name::<C>()))
    }

    /// Mutably borrows the whole storage of `C`.
    ///
    /// # Errors
    ///
    /// [`AccessError::Unregistered`] or [`AccessError::BorrowConflict`].
    pub fn try_components_mut<C: Component>(
        &self,
    ) -> CoreResult<RefMut<'_, ComponentStorage<C>>> {
        let cell = self.storage_cell::<C>()?;
        let guard = cell
            .try_borrow_mut()
            .map_err(|_| AccessError::BorrowConflict(type_name::<C>()))?;
        RefMut::filter_map(guard, |s| {
            s.storage_any_mut().downcast_mut::<ComponentStorage<C>>()
        })
        .map_err(|_| AccessError::Unregistered(type_name::<C>()))
    }

    /// Borrows the whole storage of a registered component type.
    ///
    /// # Panics
    ///
    /// Panics if `C` was never registered or is mutably borrowed.
    #[must_use]
    pub fn components<C: Component>(&self) -> Ref<'_, ComponentStorage<C>> {
        self.try_components().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Mutably borrows the whole storage of a registered component type.
    ///
    /// # Panics
    ///
    /// Panics if `C` was never registered or is already borrowed.
    #[must_use]
    pub fn components_mut<C: Component>(&self) -> RefMut<'_, ComponentStorage<C>> {
        self.try_components_mut().unwrap_or_else(|e| panic!("{e}"))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_handle(&self, id: EntityId) -> CoreResult<usize> {
        if self.is_valid(id) {
            Ok(id.index() as usize)
        } else {
            Err(AccessError::StaleHandle(id))
        }
    }

    fn storage_cell<C: Component>(&self) -> CoreResult<&RefCell<Box<dyn AnyStorage>>> {
        self.type_bits
            .get(&TypeId::of::<C>())
            .and_then(|&bit| self.storages.get(bit as usize))
            .ok_or(AccessError::Unregistered(type_name::<C>()))
    }

    /// Exclusive access without a runtime borrow, for `&mut self` paths.
    fn storage_mut_direct<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        let bit = *self.type_bits.get(&TypeId::of::<C>())?;
        self.storages
            .get_mut(bit as usize)?
            .get_mut()
            .storage_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
    }
}

fn missing_if_unregistered<C: Component>(error: AccessError, entity: EntityId) -> AccessError {
    match error {
        AccessError::Unregistered(component) => AccessError::MissingComponent { entity, component },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Transform, Velocity};
    use glam::Vec3;

    #[test]
    fn test_world_creation() {
        let world = World::new(1000);
        assert_eq!(world.capacity(), 1000);
        assert_eq!(world.alive_count(), 0);
    }

    #[test]
    fn test_create_destroy() {
        let mut world = World::new(100);

        let id1 = world.create();
        assert!(!id1.is_null());
        assert!(world.is_valid(id1));
        assert_eq!(world.alive_count(), 1);

        let id2 = world.create();
        assert!(!id2.is_null());
        assert_eq!(world.alive_count(), 2);

        assert!(world.destroy(id1));
        assert!(!world.is_valid(id1));
        assert!(!world.destroy(id1));
        assert_eq!(world.alive_count(), 1);

        // Create again - should reuse the slot
        let id3 = world.create();
        assert_eq!(id3.index(), id1.index());
        assert_ne!(id3.generation(), id1.generation());
        assert!(!world.is_valid(id1));
    }

    #[test]
    fn test_capacity_exhaustion_returns_null() {
        let mut world = World::new(2);
        world.create();
        world.create();
        assert!(world.create().is_null());
    }

    #[test]
    fn test_component_roundtrip() {
        let mut world = World::new(10);
        let id = world.create();
        assert!(world.add_component(id, Velocity::new(Vec3::X)));
        assert!(world.has_component::<Velocity>(id));
        assert_eq!(world.component::<Velocity>(id).linear, Vec3::X);

        world.component_mut::<Velocity>(id).linear = Vec3::Y;
        assert_eq!(world.get::<Velocity>(id).unwrap().linear, Vec3::Y);

        assert_eq!(world.remove_component::<Velocity>(id), Some(Velocity::new(Vec3::Y)));
        assert!(!world.has_component::<Velocity>(id));
    }

    #[test]
    fn test_stale_and_missing_are_distinguishable() {
        let mut world = World::new(10);
        let id = world.create();
        world.add_component(id, Transform::default());

        assert!(matches!(
            world.try_component::<Velocity>(id),
            Err(AccessError::MissingComponent { .. })
        ));

        world.destroy(id);
        assert_eq!(
            world.try_component::<Transform>(id).err(),
            Some(AccessError::StaleHandle(id))
        );
    }

    #[test]
    fn test_destroy_clears_components() {
        let mut world = World::new(4);
        let id = world.create();
        world.add_component(id, Transform::default());
        world.destroy(id);

        let reused = world.create();
        assert_eq!(reused.index(), id.index());
        assert!(!world.has_component::<Transform>(reused));
        assert!(world.components::<Transform>().is_empty());
    }

    #[test]
    fn test_matching_and_version() {
        let mut world = World::new(8);
        let tx = world.register::<Transform>();
        let vel = world.register::<Velocity>();

        let a = world.create();
        let b = world.create();
        world.add_component(a, Transform::default());
        world.add_component(b, Transform::default());
        world.add_component(b, Velocity::default());

        let before = world.structure_version();
        world.component_mut::<Transform>(a).position = Vec3::ONE;
        assert_eq!(world.structure_version(), before);

        let mut out = Vec::new();
        world.matching(tx.with(vel), &mut out);
        assert_eq!(out, vec![b]);
        world.matching(tx, &mut out);
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn test_storage_borrow_conflict_is_reported() {
        let mut world = World::new(4);
        world.register::<Transform>();
        let _guard = world.components_mut::<Transform>();
        assert!(matches!(
            world.try_components::<Transform>(),
            Err(AccessError::BorrowConflict(_))
        ));
    }
}
