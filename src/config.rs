//! Configuration management for the metronome engine
//!
//! Runtime configuration loads from a JSON file so defaults (startup tempo,
//! animation cadence, preset file location) can be adjusted without
//! recompilation. Missing or malformed files degrade to defaults with a
//! warning rather than failing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "metronome.json";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub presets: PresetConfig,
}

/// Beat scheduler startup parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Tempo applied at construction, clamped like any other tempo
    pub default_bpm: u32,
    /// Beats per measure applied at construction, clamped to [1, 16]
    pub default_beats_per_measure: u32,
    /// Pendulum sampling cadence in milliseconds (~60 Hz)
    pub animation_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_bpm: 120,
            default_beats_per_measure: 4,
            animation_interval_ms: 16,
        }
    }
}

/// Preset library location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetConfig {
    /// JSON file holding the ordered preset collection
    pub path: PathBuf,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("presets.json"),
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            presets: PresetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// Falls back to defaults (with a logged warning) if the file is missing
    /// or fails to parse; configuration loading never aborts the program.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location.
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scheduler.default_bpm, 120);
        assert_eq!(config.scheduler.default_beats_per_measure, 4);
        assert_eq!(config.scheduler.animation_interval_ms, 16);
        assert_eq!(config.presets.path, PathBuf::from("presets.json"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.scheduler.default_bpm, config.scheduler.default_bpm);
        assert_eq!(
            parsed.scheduler.animation_interval_ms,
            config.scheduler.animation_interval_ms
        );
        assert_eq!(parsed.presets.path, config.presets.path);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/metronome.json");
        assert_eq!(config.scheduler.default_bpm, 120);
    }
}
