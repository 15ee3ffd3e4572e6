//! Guide configuration
//!
//! JSON, every field optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tourguide_geo::{GeolocationOptions, LatLng};

use crate::selection::{SelectionSettings, DEFAULT_SELECT_RADIUS_METERS};
use crate::speech::VoiceSettings;

/// Map center used before a position fix arrives
pub const DEFAULT_CENTER: LatLng = LatLng::new(39.0201344, -77.4144);

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Select radius must be a finite, non-negative number of meters (got {0})")]
    InvalidRadius(f64),

    #[error("Storage namespace must be non-empty and free of tabs and line breaks (got {0:?})")]
    InvalidNamespace(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub select_radius_meters: f64,
    pub geolocation: GeolocationOptions,
    pub voice: VoiceSettings,
    pub default_center: LatLng,
    /// Key prefix separating one user's state from another's
    pub storage_namespace: Option<String>,
    /// Local storage file; in-memory storage when unset
    pub storage_path: Option<PathBuf>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            select_radius_meters: DEFAULT_SELECT_RADIUS_METERS,
            geolocation: GeolocationOptions::default(),
            voice: VoiceSettings::default(),
            default_center: DEFAULT_CENTER,
            storage_namespace: None,
            storage_path: None,
        }
    }
}

impl GuideConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radius = self.select_radius_meters;
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidRadius(radius));
        }
        if let Some(namespace) = &self.storage_namespace {
            if namespace.is_empty() || namespace.contains(['\t', '\n', '\r']) {
                return Err(ConfigError::InvalidNamespace(namespace.clone()));
            }
        }
        Ok(())
    }

    /// Settings for the selection model
    pub fn selection_settings(&self) -> SelectionSettings {
        SelectionSettings {
            radius_meters: self.select_radius_meters,
            voice: self.voice.clone(),
        }
    }
}
