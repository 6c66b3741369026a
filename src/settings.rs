//! Host settings
//!
//! Read from a JSON file. Everything has a default, so a partial file (or no
//! file at all) is fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::StateOverrides;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Simulator host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Frame spacing for headless runs (ms)
    pub frame_interval_ms: f64,
    /// Headless runs give up after this many frames
    pub max_frames: u32,
    /// Start pose and other template overrides
    pub initial: StateOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16.0,
            // Ten minutes at 60 fps
            max_frames: 36_000,
            initial: StateOverrides::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Settings from `path` if given, defaults otherwise. A bad file is
    /// logged and replaced by defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> String {
        // Plain data with string keys always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"frameIntervalMs": 8, "initial": {"rotation": 45}}"#).unwrap();
        assert_eq!(settings.frame_interval_ms, 8.0);
        assert_eq!(settings.max_frames, 36_000);
        assert_eq!(settings.initial.rotation, Some(45.0));
        assert_eq!(settings.initial.x, None);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::default();
        let back: Settings = serde_json::from_str(&settings.to_json()).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_missing_file_errors_and_load_falls_back() {
        let path = Path::new("/definitely/not/here/field-sim.json");
        assert!(matches!(
            Settings::from_file(path),
            Err(SettingsError::Io { .. })
        ));
        assert_eq!(Settings::load(Some(path)), Settings::default());
        assert_eq!(Settings::load(None), Settings::default());
    }

    #[test]
    fn test_bad_json_errors() {
        let path = std::env::temp_dir().join(format!("field-sim-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let result = Settings::from_file(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(SettingsError::Json { .. })));
    }
}
