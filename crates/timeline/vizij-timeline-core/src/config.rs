//! Core configuration for vizij-timeline-core.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::widget::WidgetStyle;

/// Playback and view tuning. Every field has a default, so partial JSON is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Fixed playback cadence in frames per second.
    pub playback_fps: f64,
    /// `frame_max` given to the first timeline when none exist yet.
    pub default_frame_max: i32,
    /// Smallest visible frame span the zoom window may shrink to.
    pub min_view_span: f64,
    /// Pixel width of one frame used to size the initial view window.
    pub initial_frame_pixel_width: f32,
    pub style: WidgetStyle,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            playback_fps: 30.0,
            default_frame_max: 100,
            min_view_span: 1.0,
            initial_frame_pixel_width: 10.0,
            style: WidgetStyle::default(),
        }
    }
}

impl TimelineConfig {
    /// Parse and validate a JSON config blob.
    pub fn from_json(s: &str) -> Result<Self, TimelineError> {
        let cfg: TimelineConfig =
            serde_json::from_str(s).map_err(|e| TimelineError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if !self.playback_fps.is_finite() || self.playback_fps <= 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "playback_fps must be finite and > 0 (got {})",
                self.playback_fps
            )));
        }
        if self.default_frame_max < 1 {
            return Err(TimelineError::InvalidConfig(format!(
                "default_frame_max must be >= 1 (got {})",
                self.default_frame_max
            )));
        }
        if !self.min_view_span.is_finite() || self.min_view_span < 1.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "min_view_span must be >= 1 (got {})",
                self.min_view_span
            )));
        }
        if !self.initial_frame_pixel_width.is_finite() || self.initial_frame_pixel_width <= 0.0 {
            return Err(TimelineError::InvalidConfig(
                "initial_frame_pixel_width must be finite and > 0".into(),
            ));
        }
        Ok(())
    }
}
