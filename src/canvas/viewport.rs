//! Pan/zoom transform between world space and screen space.

use egui::{Pos2, Vec2};

use crate::config::CanvasSettings;

/// Owns the canvas transform for one editor instance.
///
/// `screen = world * scale + pan_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scale: f32,
    pan_offset: Vec2,
    min_scale: f32,
    max_scale: f32,
    zoom_in_factor: f32,
    zoom_out_factor: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&CanvasSettings::default())
    }
}

impl ViewportController {
    pub fn new(settings: &CanvasSettings) -> Self {
        let mut settings = settings.clone();
        if settings.sanitize() {
            tracing::warn!("Canvas settings were out of range, using corrected values");
        }
        Self {
            scale: 1.0_f32.clamp(settings.min_scale, settings.max_scale),
            pan_offset: Vec2::ZERO,
            min_scale: settings.min_scale,
            max_scale: settings.max_scale,
            zoom_in_factor: settings.zoom_in_factor,
            zoom_out_factor: settings.zoom_out_factor,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan_offset
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.scale + self.pan_offset).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.pan_offset) / self.scale).to_pos2()
    }

    /// Convert a screen-space distance into world units.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_offset += delta;
    }

    /// Apply one wheel step centred on `cursor`.
    ///
    /// A negative `scroll_y` zooms in. The world point under the cursor stays
    /// under the cursor.
    pub fn zoom_at(&mut self, scroll_y: f32, cursor: Pos2) {
        let factor = if scroll_y < 0.0 {
            self.zoom_in_factor
        } else {
            self.zoom_out_factor
        };
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);

        let world_anchor = self.screen_to_world(cursor);
        self.scale = new_scale;
        self.pan_offset = cursor.to_vec2() - world_anchor.to_vec2() * new_scale;
    }

    /// Restore the identity transform.
    pub fn reset(&mut self) {
        self.scale = 1.0_f32.clamp(self.min_scale, self.max_scale);
        self.pan_offset = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn assert_pos_eq(a: Pos2, b: Pos2) {
        assert!(
            (a - b).length() < 1e-3,
            "Expected {:?} to be approximately equal to {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_identity_transform() {
        let viewport = ViewportController::default();
        assert_eq!(viewport.world_to_screen(pos2(12.0, 34.0)), pos2(12.0, 34.0));
        assert_eq!(viewport.screen_to_world(pos2(12.0, 34.0)), pos2(12.0, 34.0));
    }

    #[test]
    fn test_round_trip_after_pan_and_zoom() {
        let mut viewport = ViewportController::default();
        viewport.pan_by(vec2(40.0, -15.0));
        viewport.zoom_at(-1.0, pos2(300.0, 200.0));
        viewport.zoom_at(-1.0, pos2(10.0, 10.0));

        let world = pos2(123.0, -45.0);
        assert_pos_eq(viewport.screen_to_world(viewport.world_to_screen(world)), world);
    }

    #[test]
    fn test_zoom_keeps_anchor_under_cursor() {
        let mut viewport = ViewportController::default();
        let cursor = pos2(100.0, 100.0);
        let world_before = viewport.screen_to_world(cursor);

        viewport.zoom_at(-120.0, cursor);

        assert!((viewport.scale() - 1.1).abs() < 1e-6);
        assert_pos_eq(viewport.world_to_screen(world_before), cursor);
    }

    #[test]
    fn test_zoom_out_factor() {
        let mut viewport = ViewportController::default();
        viewport.zoom_at(120.0, pos2(0.0, 0.0));
        assert!((viewport.scale() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped_to_limits() {
        let mut viewport = ViewportController::default();
        for _ in 0..100 {
            viewport.zoom_at(-1.0, pos2(50.0, 50.0));
        }
        assert_eq!(viewport.scale(), 5.0);

        for _ in 0..200 {
            viewport.zoom_at(1.0, pos2(50.0, 50.0));
        }
        assert!((viewport.scale() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_screen_delta_scales_with_zoom() {
        let mut viewport = ViewportController::default();
        viewport.zoom_at(-1.0, pos2(0.0, 0.0));
        viewport.zoom_at(-1.0, pos2(0.0, 0.0));
        let delta = viewport.screen_delta_to_world(vec2(12.1, 0.0));
        assert!((delta.x - 10.0).abs() < 1e-3);
    }
}
