//! Host-facing editor configuration: defaults, merge, and sanitize.
//!
//! Loading and persisting these values is the host's job; the engine only
//! defines the shape and keeps nonsense values from reaching layout.

use serde::{Deserialize, Serialize};

use crate::metrics::FontMetrics;

/// Layout-relevant editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub word_wrap: bool,
    /// Fixed wrap column (e.g. 80). None = wrap at the viewport width.
    pub wrap_column: Option<u32>,
    pub font_size: f32,
    pub tab_stops: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            word_wrap: true,
            wrap_column: None,
            font_size: 14.0,
            tab_stops: 4,
        }
    }
}

impl EditorConfig {
    /// Clamp out-of-range values instead of rejecting the config.
    pub fn sanitize(&mut self) {
        if !self.font_size.is_finite() {
            self.font_size = Self::default().font_size;
        }
        self.font_size = self.font_size.clamp(6.0, 72.0);
        self.tab_stops = self.tab_stops.clamp(1, 16);
        if let Some(cols) = self.wrap_column {
            self.wrap_column = Some(cols.max(1));
        }
    }

    /// Derived font metrics at the configured size.
    pub fn font_metrics(&self) -> FontMetrics {
        let mut metrics = FontMetrics::new(self.font_size);
        metrics.tab_stops = self.tab_stops;
        metrics
    }

    /// Pixel budget for wrapping: a fixed column if configured, otherwise
    /// the viewport width. The wrap engine's floor still applies on top.
    pub fn wrap_width(&self, viewport_width: f32, metrics: &FontMetrics) -> f32 {
        match self.wrap_column {
            Some(cols) => cols as f32 * metrics.space_width,
            None => viewport_width,
        }
    }
}
