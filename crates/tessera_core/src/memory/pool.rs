//! # Object Pool
//!
//! Fixed-capacity alive/dead pool for transient actors (projectiles,
//! explosions, pickups).

/// Position marker for slots that are not in the alive list.
const NOT_ALIVE: usize = usize::MAX;

/// A fixed set of objects split into an alive and a dead partition.
///
/// Every slot is built once, when the pool is created, and lives until the
/// pool is dropped. Spawning moves the last dead slot to the end of the
/// alive list; despawning swaps the slot with the last alive one. Both are
/// O(1) and neither allocates.
///
/// At every instant `alive_count() + dead_count() == capacity()` and each
/// slot sits in exactly one partition.
///
/// # Exhaustion
///
/// [`Pool::acquire`] returns `None` when nothing is dead. That is a silent
/// drop: size the pool for the worst case, or check [`Pool::available`].
///
/// # Example
///
/// ```rust,ignore
/// // One parked entity per slot, created up front.
/// let mut pool = Pool::with_block(40, 16, |_| world.create());
///
/// if let Some(handle) = pool.acquire() {
///     let entity = *pool.get(handle).unwrap();
///     // initialise position, lifetime, damage...
/// }
///
/// pool.retain(|_, entity| still_flying(*entity));
/// ```
pub struct Pool<T> {
    /// One payload per slot.
    items: Box<[T]>,
    /// Alive slot indices; the first `alive_count` entries are valid.
    alive: Box<[usize]>,
    /// Dead slot indices; the first `dead_count` entries are valid.
    dead: Box<[usize]>,
    /// Where each slot sits in `alive`, or `NOT_ALIVE`.
    positions: Box<[usize]>,
    alive_count: usize,
    dead_count: usize,
}

/// Handle to a slot in a [`Pool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    slot: usize,
}

impl PoolHandle {
    /// Index of the slot inside its pool.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }
}

impl<T> Pool<T> {
    /// Creates a pool of exactly `capacity` slots, building each with `init`.
    ///
    /// All slots start dead. Slot 0 is handed out first.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize, init: impl FnMut(usize) -> T) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let items: Vec<T> = (0..capacity).map(init).collect();

        // Reversed so acquire(), which takes from the end, starts at slot 0
        let dead: Vec<usize> = (0..capacity).rev().collect();

        Self {
            items: items.into_boxed_slice(),
            alive: vec![0; capacity].into_boxed_slice(),
            dead: dead.into_boxed_slice(),
            positions: vec![NOT_ALIVE; capacity].into_boxed_slice(),
            alive_count: 0,
            dead_count: capacity,
        }
    }

    /// Creates a pool whose capacity is `requested` rounded up to a whole
    /// number of `block`-sized blocks.
    ///
    /// # Panics
    ///
    /// Panics if `block` is zero.
    #[must_use]
    pub fn with_block(requested: usize, block: usize, init: impl FnMut(usize) -> T) -> Self {
        assert!(block > 0, "Block size must be greater than zero");
        let capacity = requested.max(1).div_ceil(block) * block;
        Self::new(capacity, init)
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Number of alive slots.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of dead slots.
    #[inline]
    #[must_use]
    pub const fn dead_count(&self) -> usize {
        self.dead_count
    }

    /// Slots an `acquire` could still hand out.
    #[inline]
    #[must_use]
    pub const fn available(&self) -> usize {
        self.dead_count
    }

    /// Moves the most recently released dead slot into the alive partition.
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<PoolHandle> {
        if self.dead_count == 0 {
            tracing::trace!(capacity = self.capacity(), "pool exhausted, spawn dropped");
            return None;
        }

        self.dead_count -= 1;
        let slot = self.dead[self.dead_count];
        self.alive[self.alive_count] = slot;
        self.positions[slot] = self.alive_count;
        self.alive_count += 1;

        self.check_partitions();
        Some(PoolHandle { slot })
    }

    /// Returns an alive slot to the dead partition.
    ///
    /// Returns `false` if the slot was not alive.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        match self.positions.get(handle.slot) {
            Some(&position) if position != NOT_ALIVE => self.release_at(position).is_some(),
            _ => false,
        }
    }

    /// Releases the slot at `position` in the alive list.
    ///
    /// The last alive slot takes its place, so a loop over alive positions
    /// must not advance after a release.
    pub fn release_at(&mut self, position: usize) -> Option<PoolHandle> {
        if position >= self.alive_count {
            return None;
        }

        let slot = self.alive[position];
        let last = self.alive_count - 1;
        let moved = self.alive[last];
        self.alive[position] = moved;
        self.positions[moved] = position;
        self.alive_count = last;

        self.positions[slot] = NOT_ALIVE;
        self.dead[self.dead_count] = slot;
        self.dead_count += 1;

        self.check_partitions();
        Some(PoolHandle { slot })
    }

    /// Visits every alive slot, releasing those for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(PoolHandle, &mut T) -> bool) {
        let mut position = 0;
        while position < self.alive_count {
            let slot = self.alive[position];
            if keep(PoolHandle { slot }, &mut self.items[slot]) {
                position += 1;
            } else {
                self.release_at(position);
            }
        }
    }

    /// Releases every alive slot.
    pub fn clear(&mut self) {
        while self.release_at(0).is_some() {}
    }

    /// True if the slot is in the alive partition.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, handle: PoolHandle) -> bool {
        self.positions
            .get(handle.slot)
            .is_some_and(|&position| position != NOT_ALIVE)
    }

    /// Payload of an alive slot.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        if self.is_alive(handle) {
            self.items.get(handle.slot)
        } else {
            None
        }
    }

    /// Mutable payload of an alive slot.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        if self.is_alive(handle) {
            self.items.get_mut(handle.slot)
        } else {
            None
        }
    }

    /// Iterates alive slots in alive-list order.
    pub fn alive(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.alive[..self.alive_count]
            .iter()
            .map(|&slot| (PoolHandle { slot }, &self.items[slot]))
    }

    /// Every payload, alive or dead, in slot order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    fn check_partitions(&self) {
        debug_assert_eq!(
            self.alive_count + self.dead_count,
            self.items.len(),
            "pool partitions out of balance"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_acquire_release() {
        let mut pool = Pool::new(10, |i| i as u32 * 10);

        let h1 = pool.acquire().unwrap();
        assert_eq!(h1.slot(), 0);
        assert_eq!(*pool.get(h1).unwrap(), 0);
        assert_eq!(pool.alive_count(), 1);
        assert_eq!(pool.dead_count(), 9);

        assert!(pool.release(h1));
        assert!(!pool.release(h1));
        assert!(pool.get(h1).is_none());
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_release_then_acquire_is_lifo() {
        let mut pool = Pool::new(8, |i| i);
        let handles: Vec<_> = (0..5).map(|_| pool.acquire().unwrap()).collect();

        assert!(pool.release(handles[2]));
        assert_eq!(pool.acquire(), Some(handles[2]));
    }

    #[test]
    fn test_swap_with_last_keeps_positions() {
        let mut pool = Pool::new(4, |i| i);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();

        assert!(pool.release(a));
        let order: Vec<_> = pool.alive().map(|(h, _)| h).collect();
        assert_eq!(order, vec![c, b]);

        // c moved to position 0; releasing it by handle must still work
        assert!(pool.release(c));
        assert!(pool.is_alive(b));
        assert_eq!(pool.alive_count() + pool.dead_count(), pool.capacity());
    }

    #[test]
    fn test_retain_releases_in_place() {
        let mut pool = Pool::new(6, |i| i);
        for _ in 0..6 {
            pool.acquire();
        }
        pool.retain(|_, value| *value % 2 == 0);
        let mut kept: Vec<usize> = pool.alive().map(|(_, v)| *v).collect();
        kept.sort_unstable();
        assert_eq!(kept, vec![0, 2, 4]);
        assert_eq!(pool.dead_count(), 3);
    }

    #[test]
    fn test_with_block_rounds_up() {
        assert_eq!(Pool::with_block(40, 16, |_| ()).capacity(), 48);
        assert_eq!(Pool::with_block(32, 16, |_| ()).capacity(), 32);
        assert_eq!(Pool::with_block(0, 16, |_| ()).capacity(), 16);
    }

    #[test]
    fn test_clear() {
        let mut pool = Pool::new(3, |_| ());
        pool.acquire();
        pool.acquire();
        pool.clear();
        assert_eq!(pool.available(), 3);
    }
}
