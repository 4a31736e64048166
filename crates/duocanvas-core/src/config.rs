//! Canvas configuration.

use crate::layout::{LayoutDirection, LayoutOptions};
use crate::style::{DEFAULT_STROKE_WIDTH, SerializableColor};
use crate::viewport::ZoomRange;
use crate::viewport_sync::DEFAULT_DEBOUNCE_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Node count above which layouts run on the background worker.
pub const DEFAULT_BACKGROUND_LAYOUT_THRESHOLD: usize = 250;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for a canvas session. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub zoom_range: ZoomRange,
    /// Echo suppression window for viewport reports.
    pub debounce_ms: u64,
    pub layout: LayoutOptions,
    pub layout_direction: LayoutDirection,
    /// Graphs with more nodes than this are laid out off-thread.
    pub background_layout_threshold: usize,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_range: ZoomRange::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            layout: LayoutOptions::default(),
            layout_direction: LayoutDirection::default(),
            background_layout_threshold: DEFAULT_BACKGROUND_LAYOUT_THRESHOLD,
            stroke_color: SerializableColor::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded canvas config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ZoomRange { min, max } = self.zoom_range;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom range must be finite with a positive minimum, got {min}..{max}"
            )));
        }
        if min > max {
            return Err(ConfigError::Invalid(format!(
                "min zoom {min} exceeds max zoom {max}"
            )));
        }
        if !self.layout.is_valid() {
            return Err(ConfigError::Invalid(
                "layout sizes must be positive and spacings finite and non-negative".to_string(),
            ));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stroke width must be positive, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
