// File: crates/opening-range-core/src/canvas.rs
// Summary: Renderer-agnostic drawing surface used by figures during the paint pass.

use crate::geometry::{Rect, Segment};
use crate::style::{Color, LabelStyle, LineStyle};

pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Stroke `seg` with the style's colour and dash pattern at `width` pixels.
    fn stroke_line(&mut self, seg: Segment, style: &LineStyle, width: f32);
    /// Advance width of `text` at font size `size`, in pixels.
    fn measure_text(&self, text: &str, size: f32) -> f32;
    /// Draw `text` with its baseline-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &LabelStyle);
}
