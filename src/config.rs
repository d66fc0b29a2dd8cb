//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::Error;
use serde::Deserialize;

use crate::error::{GeotelError, Result};
use crate::telemetry::SensorKind;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub staleness: StalenessConfig,
}

/// Location sensor policies
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Reject hardware fixes with a reported accuracy radius worse than
    /// this many meters
    #[serde(default = "default_accuracy_target")]
    pub accuracy_target: f64,

    /// Minimum movement in meters before the location source reports a new
    /// fix, for sources that support it
    #[serde(default = "default_minimum_distance")]
    pub minimum_distance: f64,
}

/// Per-sensor staleness window overrides.
///
/// Keys are sensor registry names, values are seconds. Sensors without an
/// override use their built-in default window.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StalenessConfig {
    #[serde(flatten)]
    pub overrides: BTreeMap<String, u64>,
}

fn default_accuracy_target() -> f64 {
    250.0
}
fn default_minimum_distance() -> f64 {
    4.0
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            accuracy_target: default_accuracy_target(),
            minimum_distance: default_minimum_distance(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            staleness: StalenessConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Staleness window for a sensor kind, honoring configured overrides
    /// (`None` = never stale)
    pub fn stale_time_for(&self, kind: SensorKind) -> Option<u64> {
        match self.staleness.overrides.get(kind.name()) {
            Some(&seconds) => Some(seconds),
            None => kind.default_stale_time(),
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.location.accuracy_target <= 0.0 {
            return Err(GeotelError::Config(toml::de::Error::custom(
                "accuracy_target must be greater than 0",
            )));
        }

        if self.location.minimum_distance < 0.0 {
            return Err(GeotelError::Config(toml::de::Error::custom(
                "minimum_distance cannot be negative",
            )));
        }

        for name in self.staleness.overrides.keys() {
            if SensorKind::from_name(name).is_none() {
                return Err(GeotelError::Config(toml::de::Error::custom(format!(
                    "unknown sensor name in staleness overrides: {}",
                    name
                ))));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.accuracy_target, 250.0);
        assert_eq!(config.location.minimum_distance, 4.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stale_time_override() {
        let mut config = Config::default();
        config.staleness.overrides.insert("location".to_string(), 5);
        assert_eq!(config.stale_time_for(SensorKind::Location), Some(5));
        // Unconfigured kinds fall back to their built-in window.
        assert_eq!(
            config.stale_time_for(SensorKind::Battery),
            SensorKind::Battery.default_stale_time()
        );
    }

    #[test]
    fn test_accuracy_target_zero() {
        let mut config = Config::default();
        config.location.accuracy_target = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimum_distance_negative() {
        let mut config = Config::default();
        config.location.minimum_distance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_staleness_key() {
        let mut config = Config::default();
        config
            .staleness
            .overrides
            .insert("flux_capacitor".to_string(), 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[location]
accuracy_target = 50.0

[staleness]
location = 10
battery = 30
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.location.accuracy_target, 50.0);
        // Unset fields take their defaults.
        assert_eq!(config.location.minimum_distance, 4.0);
        assert_eq!(config.stale_time_for(SensorKind::Location), Some(10));
    }

    #[test]
    fn test_load_empty_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_ok());
    }
}
