// File: crates/opening-range-core/tests/common/mod.rs
// Purpose: Shared fixtures: bar builders, a fixed viewport and a recording canvas.
#![allow(dead_code)]

use opening_range_core::geometry::{Rect, Segment};
use opening_range_core::scale::{TimeScale, ValueScale};
use opening_range_core::style::{Color, LabelStyle, LineStyle};
use opening_range_core::{Bar, BarSeries, Canvas, Timestamp, Viewport};

/// 2024-03-04 00:00:00Z (a Monday).
pub const T0: Timestamp = 1_709_510_400_000;
pub const MIN: i64 = 60_000;
pub const DAY: i64 = 86_400_000;
/// Fixed advance per character used by `RecordingCanvas::measure_text`.
pub const CHAR_W: f32 = 6.0;

pub fn bar(start: Timestamp, minutes: i64, high: f64, low: f64) -> Bar {
    Bar::try_new(start, start + minutes * MIN, low, high, low, high).expect("valid bar")
}

/// One day bar per day starting at T0.
pub fn day_series(days: usize) -> BarSeries {
    let bars = (0..days).map(|d| bar(T0 + d as i64 * DAY, 1440, 120.0, 80.0)).collect();
    BarSeries::from_bars(bars).expect("ordered")
}

/// `per_day` consecutive 30 minute bars from each day's midnight. The first bar of day `d`
/// spans `100+d ± 0.5`; later bars are wider so they never tie with it.
pub fn opening_series(days: usize, per_day: usize) -> BarSeries {
    let mut bars = Vec::new();
    for d in 0..days {
        let base = 100.0 + d as f64;
        for k in 0..per_day {
            let start = T0 + d as i64 * DAY + k as i64 * 30 * MIN;
            let spread = 0.5 + k as f64;
            bars.push(bar(start, 30, base + spread, base - spread));
        }
    }
    BarSeries::from_bars(bars).expect("ordered")
}

/// 800x400 plot showing [T0, T0 + 2 days] and prices [100, 110].
pub fn viewport() -> Viewport {
    viewport_over(T0, T0 + 2 * DAY, 100.0, 110.0)
}

pub fn viewport_over(t0: Timestamp, t1: Timestamp, lo: f64, hi: f64) -> Viewport {
    let bounds = Rect::from_ltrb(0.0, 0.0, 800.0, 400.0);
    Viewport::new(
        bounds,
        TimeScale::fit(bounds.left, bounds.right, t0, t1),
        ValueScale::new_linear(bounds.top, bounds.bottom, lo, hi),
    )
}

pub fn approx(a: f32, b: f32) -> bool { (a - b).abs() < 1e-2 }

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Fill(Rect, Color),
    Line(Segment, f32),
    Text(String, f32, f32),
}

#[derive(Default)]
pub struct RecordingCanvas {
    pub ops: Vec<Op>,
}

impl RecordingCanvas {
    pub fn texts(&self) -> Vec<(String, f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(s, x, y) => Some((s.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(Segment, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Line(s, w) => Some((*s, *w)),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) { self.ops.push(Op::Fill(rect, color)); }

    fn stroke_line(&mut self, seg: Segment, _style: &LineStyle, width: f32) {
        self.ops.push(Op::Line(seg, width));
    }

    fn measure_text(&self, text: &str, _size: f32) -> f32 { text.chars().count() as f32 * CHAR_W }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _style: &LabelStyle) {
        self.ops.push(Op::Text(text.to_string(), x, y));
    }
}
