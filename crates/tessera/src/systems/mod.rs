//! # Arena Systems
//!
//! Added to the game scene in this order, right after the collision system:
//!
//! | System | Entities |
//! |--------|----------|
//! | [`PlayerSystem`] | the ship |
//! | [`NpcSystem`] | every pre-created NPC |
//! | [`WeaponSystem`] | pooled pulses |
//! | [`ItemSystem`] | pooled pickups |
//! | [`ExplosionSystem`] | pooled explosions |
//!
//! Each reads the collision buffers written earlier in the same tick.

pub mod explosion;
pub mod item;
pub mod npc;
pub mod player;
pub mod weapon;

pub use explosion::ExplosionSystem;
pub use item::ItemSystem;
pub use npc::NpcSystem;
pub use player::PlayerSystem;
pub use weapon::WeaponSystem;
