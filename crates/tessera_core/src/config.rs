//! # Engine Configuration
//!
//! Capacities that must be known before the first tick. Loaded once at
//! startup (typically from a TOML table) and never consulted in the hot path.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Startup configuration for a scene and its pools.
///
/// Every field has a default so a partial TOML table is valid.
///
/// ```rust,ignore
/// let config = EngineConfig::from_toml_str("entity_capacity = 4096")?;
/// let scene = Scene::new(&config);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of live entities per scene.
    pub entity_capacity: usize,
    /// Messages reserved per delivery buffer before the bus has to grow.
    pub message_capacity: usize,
    /// Bound of each cross-scene relay channel.
    pub relay_capacity: usize,
    /// Pool capacities are rounded up to a multiple of this.
    pub pool_block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 4096,
            message_capacity: 256,
            relay_capacity: 1024,
            pool_block_size: 16,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every capacity is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_capacity == 0 || self.entity_capacity > u32::MAX as usize {
            return Err(ConfigError::InvalidValue {
                field: "entity_capacity",
                reason: format!("{} is outside 1..=u32::MAX", self.entity_capacity),
            });
        }
        if self.relay_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "relay_capacity",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.pool_block_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pool_block_size",
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }
}
