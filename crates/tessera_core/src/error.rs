//! # Core Error Types
//!
//! Everything in the core that can fail in a way the caller may want to
//! tell apart. Pool exhaustion and dropped relay messages are deliberately
//! NOT errors; they degrade silently.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors raised when reaching into the entity registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The handle's generation no longer matches its slot, or the slot is dead.
    #[error("stale entity handle {0:?}")]
    StaleHandle(EntityId),

    /// The entity is alive but does not carry the requested component.
    #[error("entity {entity:?} has no {component} component")]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// No storage exists for this component type in the world.
    #[error("component type {0} was never registered")]
    Unregistered(&'static str),

    /// The storage is already borrowed in a conflicting way.
    #[error("storage for {0} is already borrowed")]
    BorrowConflict(&'static str),
}

/// Errors raised while loading the engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A value parsed correctly but is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, AccessError>;
