//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the sky-config.toml file.
//! It holds the observing site, how densely nights are sampled, and the list of
//! targets the planner ranks.

use crate::night::DEFAULT_INTERVAL_MINUTES;
use crate::observability::TrailingWindow;
use crate::planner::NamedTarget;
use crate::{ObserverLocation, TargetCoordinates, VisibilityError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sky-config.toml";

/// Application configuration loaded from sky-config.toml
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Observing site
    pub observer: ObserverConfig,
    /// Night sampling options
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Objects to rank for the night
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Observing site
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ObserverConfig {
    /// Human-readable site name for reference
    pub name: String,
    /// Geodetic latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Height above sea level in metres
    #[serde(default)]
    pub elevation: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Cadence of the night altitude series used for charts
    pub interval_minutes: u32,
    /// Whether a window still open at the end of the night is reported
    pub trailing_window: TrailingWindow,
}

/// A configured target, J2000 coordinates in degrees
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TargetConfig {
    pub name: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            trailing_window: TrailingWindow::Drop,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            observer: ObserverConfig {
                name: "Kitt Peak, AZ".to_string(),
                latitude: 31.9583,
                longitude: -111.5967,
                elevation: 2096.0,
            },
            sampling: SamplingConfig::default(),
            targets: vec![
                TargetConfig {
                    name: "M31".to_string(),
                    ra_deg: 10.6847,
                    dec_deg: 41.2687,
                },
                TargetConfig {
                    name: "M42".to_string(),
                    ra_deg: 83.8221,
                    dec_deg: -5.3911,
                },
                TargetConfig {
                    name: "M13".to_string(),
                    ra_deg: 250.4235,
                    dec_deg: 36.4613,
                },
            ],
        }
    }
}

impl ObserverConfig {
    /// Validated location for the engine
    pub fn to_location(&self) -> Result<ObserverLocation, VisibilityError> {
        ObserverLocation::new(self.latitude, self.longitude, self.elevation)
    }
}

impl TargetConfig {
    pub fn to_named_target(&self) -> Result<NamedTarget, VisibilityError> {
        let coordinates =
            TargetCoordinates::new(self.ra_deg, self.dec_deg).map_err(|e| match e {
                VisibilityError::InvalidInput(message) => {
                    VisibilityError::InvalidInput(format!("target {}: {}", self.name, message))
                }
                other => other,
            })?;
        Ok(NamedTarget {
            name: self.name.clone(),
            coordinates,
        })
    }
}

impl Config {
    /// Load configuration from sky-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!(
                        "Loaded configuration for site: {} ({} targets)",
                        config.observer.name,
                        config.targets.len()
                    );
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format in {}: {}", path.display(), e);
                    log::warn!("Using default configuration (Kitt Peak, AZ)");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file found at {}, using default configuration (Kitt Peak, AZ)",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// All configured targets, validated
    pub fn named_targets(&self) -> Result<Vec<NamedTarget>, VisibilityError> {
        self.targets.iter().map(TargetConfig::to_named_target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observer.name, "Kitt Peak, AZ");
        assert_eq!(config.sampling.interval_minutes, 30);
        assert_eq!(config.sampling.trailing_window, TrailingWindow::Drop);
        assert_eq!(config.targets.len(), 3);
        assert!(config.observer.to_location().is_ok());
        assert!(config.named_targets().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let file = NamedTempFile::new().unwrap();
        config.save_to_path(file.path()).unwrap();

        let parsed = Config::load_from_path(file.path());
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[observer\nlatitude = ").unwrap();
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_minimal_file_uses_section_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[observer]
name = "Backyard"
latitude = 52.2
longitude = 0.12

[sampling]
trailing_window = "close"
"#
        )
        .unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.observer.name, "Backyard");
        assert_eq!(config.observer.elevation, 0.0);
        assert_eq!(config.sampling.interval_minutes, 30);
        assert_eq!(config.sampling.trailing_window, TrailingWindow::Close);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_invalid_target_is_reported_by_name() {
        let mut config = Config::default();
        config.targets.push(TargetConfig {
            name: "Nowhere".to_string(),
            ra_deg: 400.0,
            dec_deg: 0.0,
        });
        let err = config.named_targets().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Nowhere"));
        assert_eq!(
            message.matches("invalid input").count(),
            1,
            "error prefix should appear once: {}",
            message
        );
    }
}
