//! Tuning for the narrow phase.

use serde::{Deserialize, Serialize};
use tessera_core::ConfigError;

/// Iteration limits and tolerances for GJK/EPA.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// GJK gives up (reports no overlap) after this many support queries.
    pub gjk_max_iterations: u32,
    /// EPA returns its best face after this many expansions.
    pub epa_max_iterations: u32,
    /// EPA stops once the polytope grows by less than this.
    pub epa_tolerance: f32,
    /// Contact points closer than this are merged.
    pub contact_merge_distance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gjk_max_iterations: 64,
            epa_max_iterations: 64,
            epa_tolerance: 1.0e-4,
            contact_merge_distance: 1.0e-3,
        }
    }
}

impl PhysicsConfig {
    /// Parses and validates a TOML table.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::InvalidValue`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks limits and tolerances.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gjk_max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gjk_max_iterations",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.epa_max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "epa_max_iterations",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if !(self.epa_tolerance.is_finite() && self.epa_tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "epa_tolerance",
                reason: format!("{} is not a positive number", self.epa_tolerance),
            });
        }
        if !(self.contact_merge_distance.is_finite() && self.contact_merge_distance >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "contact_merge_distance",
                reason: format!("{} is negative or not finite", self.contact_merge_distance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_table() {
        let config = PhysicsConfig::from_toml_str("epa_tolerance = 0.001").unwrap();
        assert!((config.epa_tolerance - 0.001).abs() < f32::EPSILON);
        assert_eq!(config.gjk_max_iterations, 64);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        assert!(matches!(
            PhysicsConfig::from_toml_str("gjk_max_iterations = 0"),
            Err(ConfigError::InvalidValue { field: "gjk_max_iterations", .. })
        ));
    }
}
