//! # Component Storage
//!
//! Pre-allocated, index-addressed component storage.
//!
//! The storage uses one slot per entity index:
//! - All slots are allocated when the storage is created
//! - Access is O(1) via entity index
//! - Iteration walks slots in index order, which is the registry order

use std::any::Any;

use super::component::Component;

/// Pre-allocated storage for a single component type.
///
/// Slots are `None` until a component is attached. Nothing here knows
/// about generations; the [`World`](super::World) checks handles before
/// it reaches into a storage.
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Transform> = ComponentStorage::new(1024);
/// storage.insert(0, Transform::default());
/// ```
pub struct ComponentStorage<C: Component> {
    /// One optional component per entity index.
    slots: Box<[Option<C>]>,
    /// Number of occupied slots.
    len: usize,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        Self { slots, len: 0 }
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.slots.get(index)?.as_ref()
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// True if the slot at `index` holds a component.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Stores a component, returning the one it replaced.
    ///
    /// Out-of-range indices are ignored and hand the value back.
    pub fn insert(&mut self, index: usize, component: C) -> Option<C> {
        let Some(slot) = self.slots.get_mut(index) else {
            return Some(component);
        };
        let previous = slot.replace(component);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Takes the component out of a slot.
    pub fn remove(&mut self, index: usize) -> Option<C> {
        let previous = self.slots.get_mut(index)?.take();
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    /// Iterates over occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index, c)))
    }

    /// Iterates mutably over occupied slots with their indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut C)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|c| (index, c)))
    }

    /// Empties every slot without releasing memory.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }
}

/// Type-erased view of a storage so the world can hold one per component
/// type and clear a slot without knowing `C`.
pub(crate) trait AnyStorage: Any {
    /// Drops whatever component sits at `index`.
    fn remove_slot(&mut self, index: usize);
    /// Type name of the stored component, for diagnostics.
    fn component_name(&self) -> &'static str;
    fn storage_any(&self) -> &dyn Any;
    fn storage_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> AnyStorage for ComponentStorage<C> {
    fn remove_slot(&mut self, index: usize) {
        self.remove(index);
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn storage_any(&self) -> &dyn Any {
        self
    }

    fn storage_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Transform;

    #[test]
    fn test_storage_creation() {
        let storage: ComponentStorage<Transform> = ComponentStorage::new(1000);
        assert_eq!(storage.capacity(), 1000);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_storage_insert_remove() {
        let mut storage: ComponentStorage<Transform> = ComponentStorage::new(100);

        let tx = Transform::from_position(glam::Vec3::new(1.0, 2.0, 3.0));
        assert!(storage.insert(50, tx).is_none());
        assert_eq!(storage.len(), 1);
        assert_eq!(*storage.get(50).unwrap(), tx);

        assert_eq!(storage.remove(50), Some(tx));
        assert!(storage.get(50).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage: ComponentStorage<Transform> = ComponentStorage::new(100);
        assert!(storage.get(100).is_none());
        assert!(storage.insert(100, Transform::default()).is_some());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_iter_in_index_order() {
        let mut storage: ComponentStorage<Transform> = ComponentStorage::new(10);
        storage.insert(7, Transform::default());
        storage.insert(2, Transform::default());
        let indices: Vec<usize> = storage.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![2, 7]);
    }
}
