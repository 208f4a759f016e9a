//! # Arena Directors
//!
//! - [`PlayerDirector`] and [`NpcDirector`] run in the game scene.
//! - [`ScoreDirector`] runs in the HUD scene, fed through the relay.

pub mod npc;
pub mod player;
pub mod score;

pub use npc::NpcDirector;
pub use player::{axes, keys, PlayerDirector};
pub use score::{Score, ScoreDirector};
