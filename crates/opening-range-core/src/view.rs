// File: crates/opening-range-core/src/view.rs
// Viewport: the host coordinate contract used by figure layout, plus a concrete scale-backed view.

use crate::geometry::Rect;
use crate::scale::{TimeScale, ValueScale};
use crate::series::BarSeries;
use crate::types::{Price, Timestamp};

/// Host-supplied coordinate mapping for one layout pass.
pub trait DrawContext {
    /// Visible plot rectangle in pixels; None when the host has no viewport yet.
    fn bounds(&self) -> Option<Rect>;
    /// Time span currently on screen; None when unknown.
    fn visible_time_range(&self) -> Option<(Timestamp, Timestamp)>;
    fn time_to_x(&self, t: Timestamp) -> f32;
    fn price_to_y(&self, p: Price) -> f32;
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub bounds: Option<Rect>,
    pub time: TimeScale,
    pub value: ValueScale,
}

impl Viewport {
    pub fn new(bounds: Rect, time: TimeScale, value: ValueScale) -> Self {
        Self { bounds: Some(bounds), time, value }
    }

    /// Fit the whole series into `bounds` with a 2% price margin.
    pub fn fit(series: &BarSeries, bounds: Rect) -> Self {
        let (t0, t1) = series.time_span().unwrap_or((0, 1));
        let (lo, hi) = series.price_span(t0, t1).unwrap_or((0.0, 1.0));
        let m = (hi - lo) * 0.02;
        Self::new(
            bounds,
            TimeScale::fit(bounds.left, bounds.right, t0, t1),
            ValueScale::new_linear(bounds.top, bounds.bottom, lo - m, hi + m),
        )
    }

    /// Scroll horizontally by `dx_px`.
    pub fn pan_px(&mut self, dx_px: f32) {
        self.time.pan_px(dx_px);
    }

    /// Rescale the price axis to the bars currently on screen. Returns false when none are visible.
    pub fn autoscale_visible(&mut self, series: &BarSeries) -> bool {
        let Some((t0, t1)) = self.visible_time_range() else { return false };
        match series.price_span(t0, t1) {
            Some((lo, hi)) => {
                let m = (hi - lo) * 0.02;
                self.value = ValueScale { vmin: lo - m, vmax: hi + m, ..self.value };
                if (self.value.vmax - self.value.vmin).abs() < 1e-12 { self.value.vmax = self.value.vmin + 1.0; }
                true
            }
            None => false,
        }
    }
}

impl DrawContext for Viewport {
    fn bounds(&self) -> Option<Rect> {
        self.bounds.filter(Rect::is_valid)
    }

    fn visible_time_range(&self) -> Option<(Timestamp, Timestamp)> {
        let b = self.bounds()?;
        Some((self.time.from_px(b.left), self.time.from_px(b.right)))
    }

    fn time_to_x(&self, t: Timestamp) -> f32 { self.time.to_px(t) }
    fn price_to_y(&self, p: Price) -> f32 { self.value.to_px(p) }
}
