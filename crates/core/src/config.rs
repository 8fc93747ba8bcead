//! Overlay tuning knobs
//!
//! Configuration can be built programmatically, read from environment
//! variables, or deserialized from JSON. Missing JSON fields keep their
//! defaults.

use crate::color::{check_opacity, ColorError};
use serde::{Deserialize, Serialize};

/// Tunable thresholds and opacities for the markup overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// A drag commits only when width and height both exceed this (pixels)
    pub min_highlight_size: f32,
    /// Alpha of the highlight fill
    pub fill_opacity: f32,
    /// Alpha of the highlight border
    pub border_opacity: f32,
    /// New annotations are placed this far up and left of the double-click
    pub marker_offset: f32,
    /// Square extent of a collapsed marker, used for hit testing
    pub marker_size: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            min_highlight_size: 5.0,
            fill_opacity: crate::color::FILL_OPACITY,
            border_opacity: crate::color::BORDER_OPACITY,
            marker_offset: 10.0,
            marker_size: 20.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub const ENV_MIN_HIGHLIGHT_PX: &str = "SCOREMARK_MIN_HIGHLIGHT_PX";
pub const ENV_FILL_OPACITY: &str = "SCOREMARK_FILL_OPACITY";
pub const ENV_BORDER_OPACITY: &str = "SCOREMARK_BORDER_OPACITY";
pub const ENV_MARKER_OFFSET_PX: &str = "SCOREMARK_MARKER_OFFSET_PX";

impl OverlayConfig {
    pub fn with_min_highlight_size(mut self, px: f32) -> Self {
        self.min_highlight_size = px;
        self
    }

    pub fn with_fill_opacity(mut self, alpha: f32) -> Self {
        self.fill_opacity = alpha;
        self
    }

    pub fn with_border_opacity(mut self, alpha: f32) -> Self {
        self.border_opacity = alpha;
        self
    }

    pub fn with_marker_offset(mut self, px: f32) -> Self {
        self.marker_offset = px;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SCOREMARK_MIN_HIGHLIGHT_PX`: drag threshold in pixels (default: 5)
    /// - `SCOREMARK_FILL_OPACITY`: fill alpha (default: 0.25)
    /// - `SCOREMARK_BORDER_OPACITY`: border alpha (default: 0.9)
    /// - `SCOREMARK_MARKER_OFFSET_PX`: annotation placement offset (default: 10)
    ///
    /// # Errors
    /// Returns an error if any variable holds an unparsable or out-of-range value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |key: &str| -> Result<Option<f32>, ConfigError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f32>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidValue(key.to_string())),
                None => Ok(None),
            }
        };

        if let Some(px) = read(ENV_MIN_HIGHLIGHT_PX)? {
            config.min_highlight_size = px;
        }
        if let Some(alpha) = read(ENV_FILL_OPACITY)? {
            config.fill_opacity = alpha;
        }
        if let Some(alpha) = read(ENV_BORDER_OPACITY)? {
            config.border_opacity = alpha;
        }
        if let Some(px) = read(ENV_MARKER_OFFSET_PX)? {
            config.marker_offset = px;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_highlight_size.is_finite() || self.min_highlight_size < 0.0 {
            return Err(ConfigError::InvalidValue("min_highlight_size".to_string()));
        }
        if !self.marker_offset.is_finite() {
            return Err(ConfigError::InvalidValue("marker_offset".to_string()));
        }
        if !self.marker_size.is_finite() || self.marker_size <= 0.0 {
            return Err(ConfigError::InvalidValue("marker_size".to_string()));
        }
        check_opacity(self.fill_opacity)?;
        check_opacity(self.border_opacity)?;
        Ok(())
    }
}
