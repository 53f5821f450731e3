//! Runtime configuration
//!
//! Read once at startup from `orrery.json` in the platform config directory:
//! - macOS: ~/Library/Application Support/bevyorrery/
//! - Linux: ~/.config/bevyorrery/
//! - Windows: %APPDATA%\bevyorrery\config\
//!
//! Every field has a default, so a partial file only overrides what it names.

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::orbital::curve::DEFAULT_CURVE_SAMPLES;
use crate::orbital::propagation::{DEFAULT_KEPLER_MAX_ITERATIONS, DEFAULT_KEPLER_TOLERANCE};
use crate::orbital::time::{
    DEFAULT_MIN_FRAME_INTERVAL_SECS, DEFAULT_SINGLE_STEP_DAYS, REAL_TIME_FORWARD_INDEX,
};

pub const CONFIG_FILE_NAME: &str = "orrery.json";

/// NASA NeoWs browse feed settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeoFeedConfig {
    pub url: String,
    pub api_key: String,
    /// Number of browse pages to request (20 objects each)
    pub pages: u32,
    pub cache_expiration_hours: i64,
}

impl Default for NeoFeedConfig {
    fn default() -> Self {
        Self {
            url: "https://api.nasa.gov/neo/rest/v1/neo/browse".to_string(),
            api_key: "DEMO_KEY".to_string(),
            pages: 1,
            cache_expiration_hours: 24,
        }
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    /// Minimum wall time between simulation advances
    pub min_frame_interval_secs: f64,
    pub curve_samples: usize,
    pub kepler_tolerance: f64,
    pub kepler_max_iterations: u32,
    pub initial_speed_index: usize,
    pub single_step_days: f64,
    /// Bevy world units per AU
    pub au_to_world: f32,
    /// Multiplier on body sphere radii
    pub body_display_scale: f32,
    pub include_builtin_planets: bool,
    /// Extra element files loaded at startup
    pub catalog_files: Vec<PathBuf>,
    /// NeoWs feed; disabled when absent
    pub neo_feed: Option<NeoFeedConfig>,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            min_frame_interval_secs: DEFAULT_MIN_FRAME_INTERVAL_SECS,
            curve_samples: DEFAULT_CURVE_SAMPLES,
            kepler_tolerance: DEFAULT_KEPLER_TOLERANCE,
            kepler_max_iterations: DEFAULT_KEPLER_MAX_ITERATIONS,
            initial_speed_index: REAL_TIME_FORWARD_INDEX,
            single_step_days: DEFAULT_SINGLE_STEP_DAYS,
            au_to_world: 100.0,
            body_display_scale: 1.0,
            include_builtin_planets: true,
            catalog_files: Vec::new(),
            neo_feed: None,
        }
    }
}

impl OrreryConfig {
    /// Platform config file path, if a home directory can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bevyorrery").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Read a config file. A missing file is `Ok(None)`.
    pub fn read_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load from `path`, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No config directory available, using default settings");
            return Self::default();
        };
        match Self::read_from(path) {
            Ok(Some(config)) => {
                info!("Loaded settings from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("Ignoring config file: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn load() -> Self {
        Self::load_or_default(Self::default_path().as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "bevyorrery-config-{}-{}-{}",
            test_name,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_defaults() {
        let config = OrreryConfig::default();
        assert_eq!(config.initial_speed_index, REAL_TIME_FORWARD_INDEX);
        assert_eq!(config.curve_samples, 192);
        assert_eq!(config.kepler_max_iterations, 30);
        assert!((config.min_frame_interval_secs - 1.0 / 60.0).abs() < 1e-12);
        assert!(config.include_builtin_planets);
        assert!(config.neo_feed.is_none());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = unique_temp_dir("missing");
        let result = OrreryConfig::read_from(&dir.join(CONFIG_FILE_NAME)).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = unique_temp_dir("partial");
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{ "curve_samples": 64, "neo_feed": { "pages": 3 } }"#,
        )
        .expect("write config");

        let config = OrreryConfig::read_from(&path)
            .expect("parse")
            .expect("file exists");
        assert_eq!(config.curve_samples, 64);
        assert_eq!(config.initial_speed_index, REAL_TIME_FORWARD_INDEX);
        let feed = config.neo_feed.expect("feed configured");
        assert_eq!(feed.pages, 3);
        assert_eq!(feed.api_key, "DEMO_KEY");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = unique_temp_dir("malformed");
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").expect("write config");

        assert!(OrreryConfig::read_from(&path).is_err());
        assert_eq!(OrreryConfig::load_or_default(Some(&path)), OrreryConfig::default());
    }
}
