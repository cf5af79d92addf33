//! Rectangle helpers for collision checks on the canvas.

use egui::Rect;

/// Whether two axis-aligned rectangles share any interior area.
///
/// Rectangles that only touch along an edge do not overlap.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    !(a.max.x <= b.min.x || a.min.x >= b.max.x || a.max.y <= b.min.y || a.min.y >= b.max.y)
}

/// Whether `candidate` overlaps any of `others`.
pub fn overlaps_any<'a>(candidate: Rect, others: impl IntoIterator<Item = &'a Rect>) -> bool {
    others.into_iter().any(|other| overlaps(candidate, *other))
}
