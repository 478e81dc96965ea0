//! Persisted view configuration.
//!
//! [`ViewConfig`] is the record the embedding application loads at startup and
//! saves on exit. The core itself only holds plain in-memory state; the
//! session moves this record in and out with `apply_config` and
//! `snapshot_config`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::interaction::Tool;
use crate::ortho::Camera;
use crate::quantity::{UnitSystem, XAxisKind};
use crate::render::Color;

/// Interaction thresholds of the 2D chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Wheel delta divisor for `exp(-delta / divisor)` zooming.
    pub wheel_divisor: f64,
    /// Zoom drags shorter than this many pixels are ignored.
    pub min_zoom_drag_px: f32,
    /// Fill color of the measure/zoom band.
    pub band_color: Color,
    /// Maximum number of horizontal axis ticks.
    pub max_ticks: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            wheel_divisor: 500.0,
            min_zoom_drag_px: 2.0,
            band_color: Color::rgba8(181, 217, 42, 64),
            max_ticks: 8,
        }
    }
}

/// Interaction and layout settings of the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthoConfig {
    /// Picking tolerance in pixels.
    pub selection_tolerance_px: f32,
    /// Factor applied to the projected bounding box when fitting.
    pub fit_expansion: f64,
    /// Device millimetres per horizontal pixel.
    pub mm_per_px_x: f64,
    /// Device millimetres per vertical pixel.
    pub mm_per_px_y: f64,
}

impl Default for OrthoConfig {
    fn default() -> Self {
        Self {
            selection_tolerance_px: 10.0,
            fit_expansion: 1.2,
            mm_per_px_x: 0.264_583,
            mm_per_px_y: 0.264_583,
        }
    }
}

/// Nominal pixel density of a display at scale factor 1.
pub const REFERENCE_DPI: f64 = 96.0;

const MM_PER_INCH: f64 = 25.4;

impl OrthoConfig {
    /// Same settings with the pixel size of a particular display.
    ///
    /// `device_dpi` is the physical pixel density and `scale_factor` the
    /// number of physical pixels per logical pixel. The view works in logical
    /// pixels, so one of them covers `scale_factor` physical pixels.
    /// Non-positive or non-finite inputs keep the current values.
    pub fn with_display(self, device_dpi: f64, scale_factor: f64) -> Self {
        if !(device_dpi.is_finite() && device_dpi > 0.0)
            || !(scale_factor.is_finite() && scale_factor > 0.0)
        {
            tracing::warn!(device_dpi, scale_factor, "ignoring invalid display metrics");
            return self;
        }
        let mm_per_px = MM_PER_INCH * scale_factor / device_dpi;
        Self {
            mm_per_px_x: mm_per_px,
            mm_per_px_y: mm_per_px,
            ..self
        }
    }
}

/// Everything about the views worth keeping between runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Active unit system.
    pub units: UnitSystem,
    /// Quantity on the chart's horizontal axis.
    pub x_axis: XAxisKind,
    /// Visibility per quantity key.
    pub visibility: BTreeMap<String, bool>,
    /// Active pointer tool.
    pub tool: Tool,
    /// 3D camera angles.
    pub camera: Camera,
    /// Chart thresholds.
    pub chart: ChartConfig,
    /// 3D view thresholds.
    pub ortho: OrthoConfig,
}

impl ViewConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), "loaded view configuration");
        Ok(config)
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrackError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), "saved view configuration");
        Ok(())
    }
}
