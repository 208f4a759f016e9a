//! # TESSERA Arena
//!
//! A side-scrolling arena built entirely from the core's building blocks:
//!
//! - **Game scene**: collision, ship, NPCs, pulses, pickups and explosions
//!   as systems; input and NPC waves as directors
//! - **HUD scene**: a single [`ScoreDirector`](directors::ScoreDirector)
//!   fed by a message relay from the game scene
//! - **Frame loop**: a fixed-step accumulator ticking both scenes
//!
//! ## Data flow
//!
//! ```text
//! input ──> PlayerDirector ──Command──> ship Velocity
//!                │
//!                └─TriggerChanged──> WeaponSystem ──> pooled pulses
//!
//! CollisionSystem ──collision buffers──> Player/Npc/Weapon/Item systems
//!
//! NpcSystem ──Died──> ExplosionSystem, ItemSystem, NpcDirector
//!      └───────────── relay ──> HUD scene ──> ScoreDirector
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ArenaConfig::load("arena.toml")?;
//! let mut frames = tessera::arena::build(&config)?;
//! loop {
//!     frames.input(&event);
//!     frames.frame(elapsed);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod components;
pub mod config;
pub mod directors;
pub mod error;
pub mod game_loop;
pub mod messages;
pub mod systems;

pub use config::{ArenaConfig, ArenaSettings};
pub use error::{ArenaError, ArenaResult};
pub use game_loop::{FrameLoop, FrameStats};
