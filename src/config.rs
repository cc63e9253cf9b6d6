//! # Configuration Management
//!
//! Loads runtime configuration from `starmap-config.toml`: the observing
//! site, star-chart limits, constellation selection, and sampling cadences.
//! A missing or invalid file falls back to the built-in defaults (the
//! Brisbane reference site) with a logged warning, so the pipeline always
//! has a complete configuration to work from. There is no module-level
//! mutable state; the loaded value is passed explicitly to each consumer.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::Observer;

/// Application configuration loaded from starmap-config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Observing site and presentation time zone.
    pub observer: ObserverConfig,
    /// Star chart limits.
    pub stars: StarsConfig,
    /// Constellation figure selection.
    pub constellations: ConstellationsConfig,
    /// Path sampling cadences.
    pub sampling: SamplingConfig,
}

/// Observing site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Elevation above sea level in meters.
    pub elevation_m: f64,
    /// Altitude of the effective horizon in degrees (0 = astronomical
    /// horizon; raise for obstructed sites).
    pub horizon_offset_deg: f64,
    /// UTC offset in hours for displayed times. Presentation only; every
    /// computation runs in UTC.
    pub utc_offset_hours: f64,
}

impl ObserverConfig {
    pub fn observer(&self) -> Observer {
        Observer {
            latitude_deg: self.latitude,
            longitude_deg: self.longitude,
            elevation_m: self.elevation_m,
            horizon_offset_deg: self.horizon_offset_deg,
        }
    }
}

/// Star chart configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarsConfig {
    /// Apparent magnitude limit for inclusion (6.5 ≈ naked-eye limit).
    pub naked_eye_mag_limit: f64,
    /// Stars brighter than this get labels in renderers.
    pub label_mag_limit: f64,
    /// Cap on the number of ranked stars returned; `None` returns all.
    pub max_stars_to_plot: Option<usize>,
    /// Star catalog JSON file.
    pub catalog_path: String,
}

/// Constellation figure configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstellationsConfig {
    /// Constellation line dataset JSON file.
    pub lines_path: String,
    /// Cap on projected figures; `None` projects all.
    pub max_to_plot: Option<usize>,
    /// When set, only these constellation ids are projected.
    pub show_only: Option<Vec<String>>,
}

/// Path sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sun/Moon path cadence in minutes. Smaller steps trade latency for
    /// smoothness.
    pub sun_moon_step_minutes: i64,
    /// Planet path cadence in minutes.
    pub planet_step_minutes: i64,
    /// Sample count for the celestial equator and ecliptic lines.
    pub line_samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            observer: ObserverConfig {
                latitude: -27.47,
                longitude: 153.02,
                elevation_m: 0.0,
                horizon_offset_deg: 0.0,
                utc_offset_hours: 10.0, // Brisbane
            },
            stars: StarsConfig {
                naked_eye_mag_limit: 6.5,
                label_mag_limit: 2.0,
                max_stars_to_plot: Some(500),
                catalog_path: "data/bsc5-short.json".to_string(),
            },
            constellations: ConstellationsConfig {
                lines_path: "data/constellations.lines.json".to_string(),
                max_to_plot: None,
                show_only: None,
            },
            sampling: SamplingConfig {
                sun_moon_step_minutes: 20,
                planet_step_minutes: 30,
                line_samples: 24,
            },
        }
    }
}

impl Config {
    /// Load configuration from starmap-config.toml in the working
    /// directory, falling back to defaults if absent or invalid.
    pub fn load() -> Self {
        Self::load_from_path("starmap-config.toml")
    }

    /// Load configuration from the given path, falling back to defaults
    /// if absent or invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        "loaded configuration from {}",
                        path.as_ref().display()
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        "invalid config file {}: {err}; using defaults",
                        path.as_ref().display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    "no config file at {}; using defaults",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Save the configuration to starmap-config.toml.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write("starmap-config.toml", contents)?;
        info!("configuration saved to starmap-config.toml");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_the_brisbane_reference_site() {
        let config = Config::default();
        assert_eq!(config.observer.latitude, -27.47);
        assert_eq!(config.observer.longitude, 153.02);
        assert_eq!(config.observer.utc_offset_hours, 10.0);
        assert_eq!(config.stars.naked_eye_mag_limit, 6.5);
        assert_eq!(config.stars.max_stars_to_plot, Some(500));
        assert_eq!(config.sampling.sun_moon_step_minutes, 20);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.observer.latitude, config.observer.latitude);
        assert_eq!(parsed.stars.catalog_path, config.stars.catalog_path);
        assert_eq!(parsed.constellations.show_only, config.constellations.show_only);
    }

    #[test]
    fn load_nonexistent_file_falls_back_to_defaults() {
        let config = Config::load_from_path("/nonexistent/starmap.toml");
        assert_eq!(config.observer.latitude, -27.47);
    }

    #[test]
    fn load_invalid_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "this is not toml at all [[[").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.observer.longitude, 153.02);
    }

    #[test]
    fn observer_config_builds_an_observer() {
        let observer = Config::default().observer.observer();
        assert_eq!(observer.latitude_deg, -27.47);
        assert_eq!(observer.horizon_offset_deg, 0.0);
    }
}
