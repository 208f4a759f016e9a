//! # TESSERA Core Engine
//!
//! The runtime substrate every gameplay crate builds on:
//! - Entity registry with generational handles
//! - Per-type component storage sized once at startup
//! - Scenes that tick their systems in insertion order
//! - A double-buffered message bus and tag-based command dispatch
//! - Fixed-capacity alive/dead object pools for transient actors
//!
//! ## Architecture Rules
//!
//! 1. **One scene, one thread** - a tick runs every system sequentially
//! 2. **Capacity is decided up front** - registries and pools never grow mid-play
//! 3. **Degrade, don't stall** - exhausted pools and full relays drop silently
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{EngineConfig, Scene};
//!
//! let mut scene = Scene::new(&EngineConfig::default());
//! scene.add_system(MovementSystem::default());
//! scene.simulate(1.0 / 60.0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod message;

pub use config::EngineConfig;
pub use ecs::{
    AsAny, Command, CommandDispatcher, CommandTarget, Component, ComponentMask, DispatchStats,
    ComponentStorage, Director, EntityId, InputEvent, Requirements, Scene, SceneContext,
    System, Transform, Velocity, World,
};
pub use error::{AccessError, ConfigError, CoreResult};
pub use memory::{Pool, PoolHandle};
pub use message::{Message, MessageBus, MessageId, MessageRelay, RelayReceiver, RelaySender};
