//! Tunable settings for the canvas and the backend services
//!
//! Every field carries a serde default so a partial `settings.toml` only
//! needs to name the values it overrides.
//!
//! # Main Types
//!
//! - [`CanvasSettings`] - Zoom limits, drag threshold, placement search and node size
//! - [`ServiceSettings`] - Backend base URLs and request timeout

use egui::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest zoom level the viewport allows
pub const DEFAULT_MIN_SCALE: f32 = 0.1;

/// Largest zoom level the viewport allows
pub const DEFAULT_MAX_SCALE: f32 = 5.0;

/// Default width of a node whose rendered size is unknown
pub const DEFAULT_NODE_WIDTH: f32 = 120.0;

/// Default height of a node whose rendered size is unknown
pub const DEFAULT_NODE_HEIGHT: f32 = 60.0;

/// Canvas interaction and placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Lower zoom bound
    pub min_scale: f32,

    /// Upper zoom bound
    pub max_scale: f32,

    /// Scale multiplier for one wheel step toward the content
    pub zoom_in_factor: f32,

    /// Scale multiplier for one wheel step away from the content
    pub zoom_out_factor: f32,

    /// Pointer travel in pixels before a secondary press becomes a pan
    pub drag_threshold: f32,

    /// Grid step of the placement search in world units
    pub placement_step: f32,

    /// Extent of the placement search along each axis in world units
    pub placement_bound: f32,

    /// Upper bound of the random offset used when the search is exhausted
    pub fallback_jitter: f32,

    /// Fallback node width
    pub node_width: f32,

    /// Fallback node height
    pub node_height: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            drag_threshold: 2.0,
            placement_step: 20.0,
            placement_bound: 3000.0,
            fallback_jitter: 100.0,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
        }
    }
}

impl CanvasSettings {
    /// Size assumed for nodes until the renderer reports a measurement
    pub fn default_node_size(&self) -> Vec2 {
        vec2(self.node_width, self.node_height)
    }

    /// Clamp inconsistent values into a usable range.
    ///
    /// Non-finite values fall back to their defaults. Returns `true` if
    /// anything was changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();
        let defaults = Self::default();

        fix(&mut self.min_scale, defaults.min_scale, |v| v > 0.0);
        fix(&mut self.max_scale, defaults.max_scale, |v| v > 0.0);
        if self.max_scale < self.min_scale {
            self.max_scale = self.min_scale;
        }
        fix(&mut self.zoom_in_factor, defaults.zoom_in_factor, |v| v > 1.0);
        fix(&mut self.zoom_out_factor, defaults.zoom_out_factor, |v| {
            v > 0.0 && v < 1.0
        });
        fix(&mut self.placement_step, defaults.placement_step, |v| v > 0.0);
        fix(&mut self.placement_bound, defaults.placement_bound, |v| v >= 0.0);
        fix(&mut self.drag_threshold, defaults.drag_threshold, |_| true);
        fix(&mut self.fallback_jitter, defaults.fallback_jitter, |_| true);
        fix(&mut self.node_width, defaults.node_width, |_| true);
        fix(&mut self.node_height, defaults.node_height, |_| true);
        self.drag_threshold = self.drag_threshold.max(0.0);
        self.fallback_jitter = self.fallback_jitter.max(0.0);
        self.node_width = self.node_width.max(1.0);
        self.node_height = self.node_height.max(1.0);

        *self != before
    }
}

/// Replace `value` with `default` unless it is finite and passes `valid`.
fn fix(value: &mut f32, default: f32, valid: impl Fn(f32) -> bool) {
    if !(value.is_finite() && valid(*value)) {
        *value = default;
    }
}

/// Backend endpoints used by the service layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL of the pipeline persistence API, with trailing slash
    pub pipeline_base_url: String,

    /// Base URL of the extract runner API, with trailing slash
    pub extract_base_url: String,

    /// Request timeout in milliseconds (0 disables the timeout)
    pub timeout_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            pipeline_base_url: "https://localhost:7027/api/".to_string(),
            extract_base_url: "https://localhost:7087/api/".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ServiceSettings {
    /// Configured timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_defaults() {
        let settings = CanvasSettings::default();
        assert_eq!(settings.min_scale, 0.1);
        assert_eq!(settings.max_scale, 5.0);
        assert_eq!(settings.default_node_size(), vec2(120.0, 60.0));
    }

    #[test]
    fn test_sanitize_fixes_inverted_scale() {
        let mut settings = CanvasSettings {
            min_scale: 2.0,
            max_scale: 1.0,
            placement_step: 0.0,
            ..Default::default()
        };
        assert!(settings.sanitize());
        assert_eq!(settings.max_scale, 2.0);
        assert_eq!(settings.placement_step, 20.0);

        let mut clean = CanvasSettings::default();
        assert!(!clean.sanitize());
    }

    #[test]
    fn test_sanitize_replaces_non_finite_values() {
        let mut settings = CanvasSettings {
            max_scale: f32::NAN,
            zoom_in_factor: 0.5,
            zoom_out_factor: f32::INFINITY,
            placement_bound: f32::NAN,
            node_width: f32::NEG_INFINITY,
            ..Default::default()
        };
        assert!(settings.sanitize());
        assert_eq!(settings, CanvasSettings::default());
    }

    #[test]
    fn test_timeout_zero_disables() {
        let settings = ServiceSettings {
            timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.timeout(), None);
        assert_eq!(
            ServiceSettings::default().timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
