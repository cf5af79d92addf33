//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use egui::Pos2;

/// Assert two points are approximately equal
pub fn assert_pos_eq(a: Pos2, b: Pos2, epsilon: f32) {
    assert!(
        (a.x - b.x).abs() < epsilon && (a.y - b.y).abs() < epsilon,
        "Expected {:?} to be approximately equal to {:?} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
