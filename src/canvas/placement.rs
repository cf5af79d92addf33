//! Collision-avoiding insertion point search.
//!
//! Candidates are scanned row by row from the anchor: the outer loop walks
//! down in `step` increments, the inner loop walks right, and the first
//! candidate clear of every occupied rectangle wins.

use egui::{vec2, Pos2, Rect, Vec2};
use rand::Rng;

use super::geometry::overlaps_any;
use crate::config::CanvasSettings;

/// Outcome of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// A position that overlaps no existing node.
    Free(Pos2),
    /// The search bound was exhausted; the position is the anchor plus random
    /// jitter and may overlap other nodes.
    Fallback(Pos2),
}

impl Placement {
    pub fn position(&self) -> Pos2 {
        match self {
            Placement::Free(p) | Placement::Fallback(p) => *p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Placement::Fallback(_))
    }
}

/// Raster-scan placement solver.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSolver {
    step: f32,
    bound: f32,
    jitter: f32,
}

impl Default for PlacementSolver {
    fn default() -> Self {
        Self::new(&CanvasSettings::default())
    }
}

impl PlacementSolver {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            step: settings.placement_step,
            bound: settings.placement_bound,
            jitter: settings.fallback_jitter,
        }
    }

    /// Find a spot for a node of `size` near `anchor`.
    pub fn find(&self, anchor: Pos2, size: Vec2, occupied: &[Rect]) -> Placement {
        if let Some(pos) = self.scan(anchor, size, occupied) {
            return Placement::Free(pos);
        }

        tracing::warn!(
            "No free space within {} units of {:?}, placing with fallback",
            self.bound,
            anchor
        );
        let mut rng = rand::rng();
        let jitter = if self.jitter > 0.0 {
            vec2(
                rng.random_range(0.0..self.jitter),
                rng.random_range(0.0..self.jitter),
            )
        } else {
            Vec2::ZERO
        };
        Placement::Fallback(anchor + jitter)
    }

    /// Deterministic part of the search.
    fn scan(&self, anchor: Pos2, size: Vec2, occupied: &[Rect]) -> Option<Pos2> {
        // Integer counters keep the offsets exact multiples of the step.
        let steps = (self.bound / self.step).ceil() as u32;
        for row in 0..steps {
            let offset_y = row as f32 * self.step;
            for col in 0..steps {
                let offset_x = col as f32 * self.step;
                let candidate = anchor + vec2(offset_x, offset_y);
                if !overlaps_any(Rect::from_min_size(candidate, size), occupied) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const SIZE: Vec2 = Vec2 { x: 120.0, y: 60.0 };

    fn block(x: f32, y: f32) -> Rect {
        Rect::from_min_size(pos2(x, y), SIZE)
    }

    #[test]
    fn test_empty_canvas_uses_anchor() {
        let solver = PlacementSolver::default();
        assert_eq!(
            solver.find(pos2(33.0, 44.0), SIZE, &[]),
            Placement::Free(pos2(33.0, 44.0))
        );
    }

    #[test]
    fn test_steps_right_past_obstacle() {
        let solver = PlacementSolver::default();
        let occupied = [block(0.0, 0.0)];
        // First clear column is x = 120, reached after six 20-unit steps.
        assert_eq!(
            solver.find(pos2(0.0, 0.0), SIZE, &occupied),
            Placement::Free(pos2(120.0, 0.0))
        );
    }

    #[test]
    fn test_row_major_prefers_same_row() {
        let solver = PlacementSolver::default();
        // Obstacle only covers the anchor's row start; a free spot below
        // exists but the scan finishes the first row before moving down.
        let occupied = [block(0.0, 0.0), block(120.0, 0.0)];
        assert_eq!(
            solver.find(pos2(0.0, 0.0), SIZE, &occupied),
            Placement::Free(pos2(240.0, 0.0))
        );
    }

    #[test]
    fn test_deterministic_within_bound() {
        let solver = PlacementSolver::default();
        let occupied = [block(10.0, 10.0), block(200.0, 30.0), block(-50.0, 90.0)];
        let first = solver.find(pos2(0.0, 0.0), SIZE, &occupied);
        for _ in 0..5 {
            assert_eq!(solver.find(pos2(0.0, 0.0), SIZE, &occupied), first);
        }
        assert!(!first.is_degraded());
    }

    #[test]
    fn test_exhausted_bound_falls_back() {
        let settings = CanvasSettings {
            placement_bound: 100.0,
            ..Default::default()
        };
        let solver = PlacementSolver::new(&settings);
        let wall = Rect::from_min_size(pos2(-500.0, -500.0), vec2(2000.0, 2000.0));

        let placement = solver.find(pos2(0.0, 0.0), SIZE, &[wall]);
        assert!(placement.is_degraded());
        let pos = placement.position();
        assert!((0.0..100.0).contains(&pos.x));
        assert!((0.0..100.0).contains(&pos.y));
    }
}
