//! # Entity Component System
//!
//! Entities are generational handles, components live in per-type
//! storages sized once with the world, and a [`Scene`] ticks its systems
//! and directors in a fixed order.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated at world creation
//! - Entity IDs are indices with generation counters
//! - Systems run strictly one after another
//! - Directors steer entities through commands, never by owning them

mod command;
mod component;
mod director;
mod entity;
mod scene;
mod storage;
mod system;
mod world;

pub use command::{Command, CommandDispatcher, DispatchStats};
pub use component::{CommandTarget, Component, ComponentMask, Transform, Velocity};
pub use director::{Director, InputEvent};
pub use entity::EntityId;
pub use scene::Scene;
pub use storage::ComponentStorage;
pub use system::{AsAny, Requirements, SceneContext, System};
pub use world::{World, MAX_COMPONENT_TYPES};
