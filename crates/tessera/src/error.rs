//! # Arena Error Types

use thiserror::Error;

/// Errors raised while loading or building the arena.
#[derive(Error, Debug)]
pub enum ArenaError {
    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration was malformed or out of range.
    #[error(transparent)]
    Config(#[from] tessera_core::ConfigError),

    /// A collision shape was rejected.
    #[error(transparent)]
    Shape(#[from] tessera_physics::ShapeError),

    /// The world ran out of entity slots while the arena was populated.
    #[error("entity capacity {capacity} is too small for the arena")]
    WorldFull {
        /// Configured entity capacity.
        capacity: usize,
    },
}

/// Result type for arena setup.
pub type ArenaResult<T> = Result<T, ArenaError>;
