//! # TESSERA Physics
//!
//! Collision detection as a scene system. Objects carry shapes and
//! group/flag masks; every tick the [`CollisionSystem`] tests each pair and
//! records who touched whom, with a contact manifold per partner.
//!
//! There is no response step: nothing is pushed apart, no velocity is
//! changed. Gameplay systems read the buffers and decide.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_physics::{CollisionSystem, PhysicsObject, PhysicsShape};
//!
//! scene.add_system(CollisionSystem::default());
//!
//! let mut body = PhysicsObject::new(1.0, 1.0).with_shape(PhysicsShape::sphere(0.5))?;
//! body.set_collision_groups(PLAYER);
//! body.set_collision_flags(NPC);
//! scene.world_mut().add_component(player, body);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod broad;
pub mod config;
pub mod error;
mod narrow;
pub mod object;
pub mod shape;
pub mod system;

pub use broad::{passes_filter, Aabb};
pub use config::PhysicsConfig;
pub use error::{PhysicsResult, ShapeError};
pub use object::{
    Manifold, ManifoldPoint, PhysicsObject, MAX_COLLISIONS, MAX_MANIFOLD_POINTS, MAX_SHAPES,
};
pub use shape::{Axis, PhysicsShape, ShapeKind};
pub use system::{CollisionStats, CollisionSystem};
