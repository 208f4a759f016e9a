//! # Memory Management
//!
//! Pre-allocated pools for zero-allocation gameplay.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. During gameplay:
//! - No heap allocations
//! - Spawning and despawning are O(1) index swaps
//! - Exhaustion drops the spawn instead of growing

mod pool;

pub use pool::{Pool, PoolHandle};
