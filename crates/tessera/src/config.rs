//! # Arena Configuration
//!
//! One TOML document with three tables:
//!
//! ```toml
//! [engine]
//! entity_capacity = 512
//!
//! [physics]
//! epa_tolerance = 0.0001
//!
//! [arena]
//! seed = 7
//! pulse_capacity = 40
//! ```
//!
//! Missing tables and keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::{ConfigError, EngineConfig};
use tessera_physics::PhysicsConfig;

use crate::error::{ArenaError, ArenaResult};

/// Gameplay tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Seed for the NPC director's jitter.
    pub seed: u64,
    /// Simulation steps per second.
    pub tick_rate: u32,
    /// Longest frame fed to the accumulator, in seconds.
    pub max_frame_time: f32,
    /// Pulses in flight at once.
    pub pulse_capacity: usize,
    /// Explosions on screen at once.
    pub explosion_capacity: usize,
    /// Pickups on screen at once.
    pub item_capacity: usize,
    /// Pre-created drones.
    pub drones: usize,
    /// Pre-created gunships.
    pub gunships: usize,
    /// Pre-created elites.
    pub elites: usize,
    /// NPCs released per round.
    pub releases_per_round: u32,
    /// Seconds between the last NPC leaving and the next round.
    pub round_pause: f32,
    /// Half the arena height; the ship and NPC lanes stay inside.
    pub half_height: f32,
    /// Half the arena width; NPCs enter at `+half_width` and escape at `-half_width`.
    pub half_width: f32,
    /// Ship speed in units per second.
    pub ship_speed: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            seed: 0x7E55_E7A,
            tick_rate: 60,
            max_frame_time: 0.1,
            pulse_capacity: 40,
            explosion_capacity: 16,
            item_capacity: 8,
            drones: 12,
            gunships: 6,
            elites: 1,
            releases_per_round: 20,
            round_pause: 3.0,
            half_height: 4.5,
            half_width: 9.0,
            ship_speed: 6.0,
        }
    }
}

/// Complete startup configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Scene capacities.
    pub engine: EngineConfig,
    /// Narrow-phase tuning.
    pub physics: PhysicsConfig,
    /// Gameplay tuning.
    pub arena: ArenaSettings,
}

impl ArenaConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for malformed or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Io`] if the file cannot be read, otherwise as
    /// [`ArenaConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ArenaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ArenaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "arena configuration loaded");
        Ok(config)
    }

    /// Checks every table, then that the arena fits in the world.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.physics.validate()?;

        let arena = &self.arena;
        if arena.tick_rate == 0 {
            return Err(invalid("arena.tick_rate", "must be greater than zero"));
        }
        if !(arena.max_frame_time.is_finite() && arena.max_frame_time > 0.0) {
            return Err(invalid("arena.max_frame_time", "must be a positive number"));
        }
        if arena.pulse_capacity == 0 {
            return Err(invalid("arena.pulse_capacity", "must be greater than zero"));
        }
        if !(arena.half_width > 0.0 && arena.half_height > 0.0) {
            return Err(invalid("arena.half_width", "arena extents must be positive"));
        }

        let needed = self.entities_needed();
        if needed > self.engine.entity_capacity {
            return Err(ConfigError::InvalidValue {
                field: "engine.entity_capacity",
                reason: format!("arena needs {needed} entities"),
            });
        }
        Ok(())
    }

    /// Fixed simulation step in seconds.
    #[must_use]
    pub fn step(&self) -> f32 {
        1.0 / self.arena.tick_rate as f32
    }

    /// Entities created up front: the ship plus every pool.
    ///
    /// Pool capacities are rounded up to the engine's block size.
    #[must_use]
    pub fn entities_needed(&self) -> usize {
        let block = self.engine.pool_block_size.max(1);
        let rounded = |n: usize| n.max(1).div_ceil(block) * block;
        let arena = &self.arena;
        1 + rounded(arena.pulse_capacity)
            + rounded(arena.explosion_capacity)
            + rounded(arena.item_capacity)
            + arena.drones
            + arena.gunships
            + arena.elites
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tables_are_optional() {
        let config = ArenaConfig::from_toml_str(
            "[arena]\nseed = 42\n\n[physics]\ngjk_max_iterations = 32\n",
        )
        .unwrap();
        assert_eq!(config.arena.seed, 42);
        assert_eq!(config.physics.gjk_max_iterations, 32);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_rejects_world_too_small() {
        let err = ArenaConfig::from_toml_str("[engine]\nentity_capacity = 16\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "engine.entity_capacity", .. }
        ));
    }

    #[test]
    fn test_pool_rounding_counts() {
        let mut config = ArenaConfig::default();
        config.engine.pool_block_size = 16;
        config.arena.pulse_capacity = 40;
        config.arena.explosion_capacity = 1;
        config.arena.item_capacity = 16;
        config.arena.drones = 2;
        config.arena.gunships = 0;
        config.arena.elites = 0;
        assert_eq!(config.entities_needed(), 1 + 48 + 16 + 16 + 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ArenaConfig::load("/definitely/not/here.toml"),
            Err(ArenaError::Io { .. })
        ));
    }
}
