//! # Physics Error Types
//!
//! Shape validation is a setup-time contract: objects are checked when
//! shapes are added, never while the collision system runs.

use thiserror::Error;

/// Errors raised while building a [`PhysicsObject`](crate::PhysicsObject).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// The object already holds the maximum number of shapes.
    #[error("physics object already holds {max} shapes")]
    TooManyShapes {
        /// The shape limit.
        max: usize,
    },

    /// An extent is zero, negative or not finite.
    #[error("{shape} {field} must be positive and finite, got {value}")]
    InvalidExtent {
        /// Shape kind name.
        shape: &'static str,
        /// Offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A hull needs at least one point.
    #[error("hull shape has no points")]
    EmptyHull,

    /// A compound needs at least one child.
    #[error("compound shape has no children")]
    EmptyCompound,

    /// Compounds may only contain primitive shapes.
    #[error("compound shapes cannot contain other compounds")]
    NestedCompound,

    /// A local offset or rotation is not finite.
    #[error("shape placement is not finite")]
    InvalidPlacement,
}

/// Result type for physics setup.
pub type PhysicsResult<T> = Result<T, ShapeError>;
