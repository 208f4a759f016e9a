//! # Pool Scenario Tests
//!
//! The alive/dead partition must stay balanced through any sequence of
//! spawns and despawns, and exhaustion must degrade to a dropped spawn.

use tessera_core::{EntityId, Pool, PoolHandle, World};

fn assert_balanced<T>(pool: &Pool<T>) {
    assert_eq!(pool.alive_count() + pool.dead_count(), pool.capacity());
}

#[test]
fn capacity_four_scenario() {
    let mut world = World::new(16);
    let mut pool = Pool::new(4, |_| world.create());
    assert_balanced(&pool);

    let handles: Vec<PoolHandle> = (0..4).map(|_| pool.acquire().unwrap()).collect();
    assert_balanced(&pool);
    assert_eq!(pool.alive_count(), 4);

    // Fifth spawn is dropped, nothing changes
    assert!(pool.acquire().is_none());
    assert_eq!(pool.alive_count(), 4);
    assert_balanced(&pool);

    assert!(pool.release(handles[1]));
    assert_balanced(&pool);

    let again = pool.acquire().unwrap();
    assert_eq!(again, handles[1]);
    let entity: EntityId = *pool.get(again).unwrap();
    assert!(world.is_valid(entity));
    assert_balanced(&pool);
}

#[test]
fn partitions_stay_balanced_under_mixed_traffic() {
    let mut pool = Pool::with_block(50, 16, |slot| slot);
    assert_eq!(pool.capacity(), 64);

    // Deterministic xorshift so the sequence is reproducible
    let mut state = 0x9E37_79B9_u32;
    let mut live: Vec<PoolHandle> = Vec::new();
    for _ in 0..2_000 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;

        if state % 3 == 0 && !live.is_empty() {
            let victim = live.swap_remove(state as usize % live.len());
            assert!(pool.release(victim));
        } else if let Some(handle) = pool.acquire() {
            live.push(handle);
        } else {
            assert_eq!(pool.available(), 0);
        }
        assert_balanced(&pool);
        assert_eq!(pool.alive_count(), live.len());
    }

    for handle in &live {
        assert!(pool.is_alive(*handle));
    }
}

#[test]
fn every_slot_lives_in_exactly_one_partition() {
    let mut pool = Pool::new(8, |slot| slot);
    for _ in 0..5 {
        pool.acquire();
    }
    pool.retain(|handle, _| handle.slot() != 3);

    let alive: Vec<usize> = pool.alive().map(|(h, _)| h.slot()).collect();
    for slot in 0..pool.capacity() {
        let handle = pool.items()[slot];
        let in_alive = alive.contains(&handle);
        assert_eq!(in_alive, slot < 5 && slot != 3, "slot {slot}");
    }
}
