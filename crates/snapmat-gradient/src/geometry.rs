//! Gradient line geometry
//!
//! Converts a CSS angle into concrete endpoints over a rectangle. The
//! line runs through the rectangle center and reaches half a diagonal
//! out on both sides, so every corner projects inside it at any angle.

use std::f32::consts::PI;

/// Endpoints of a gradient line, in pixel coordinates (y grows down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientLine {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl GradientLine {
    /// Vector from start to end.
    pub fn delta(&self) -> (f32, f32) {
        (self.x1 - self.x0, self.y1 - self.y0)
    }
}

/// Gradient line for `angle` degrees across a `width` x `height` rect.
///
/// CSS convention: 0 degrees points to the top edge, 90 to the right,
/// and the colors progress from the start endpoint toward the end.
pub fn gradient_line(angle: f32, width: f32, height: f32) -> GradientLine {
    let radians = (angle - 90.0) * PI / 180.0;
    let cx = width / 2.0;
    let cy = height / 2.0;
    let reach = (cx * cx + cy * cy).sqrt();
    let dx = radians.cos() * reach;
    let dy = radians.sin() * reach;

    GradientLine {
        x0: cx - dx,
        y0: cy - dy,
        x1: cx + dx,
        y1: cy + dy,
    }
}
