//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change. The CLI layers its flags on top.

use std::path::{Path, PathBuf};

use scene::projection::ProjectionConfig;
use scene::rotation::DEFAULT_ROTATION_SPEED;
use scene::visibility::ViewFilterState;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {source}", path.display())
            }
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// URL or path of the topology document; the sample dataset when unset.
    pub topology: Option<String>,
    /// URL or path of the cable document; the sample dataset when unset.
    pub cables: Option<String>,
    pub projection: ProjectionConfig,
    /// Radians per second.
    pub rotation_speed: f64,
    pub filter: ViewFilterState,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            topology: None,
            cables: None,
            projection: ProjectionConfig::default(),
            rotation_speed: DEFAULT_ROTATION_SPEED,
            filter: ViewFilterState::default(),
            canvas_width: 1280.0,
            canvas_height: 720.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(payload: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&payload, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !(p.base_radius.is_finite() && p.base_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base radius must be positive, got {}",
                p.base_radius
            )));
        }
        if !(p.altitude_scale.is_finite() && p.altitude_scale >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "altitude scale must be non-negative, got {}",
                p.altitude_scale
            )));
        }
        if !self.rotation_speed.is_finite() {
            return Err(ConfigError::Invalid("rotation speed must be finite".to_string()));
        }
        if !(self.canvas_width >= 1.0 && self.canvas_height >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }
}
