// File: crates/opening-range-core/src/scale.rs
// Summary: Time (X) and price (Y) scale transforms with pan support.

use crate::types::{Price, Timestamp};

/// Horizontal time scale: pixel position of `start_time` plus pixels per millisecond.
#[derive(Clone, Copy, Debug)]
pub struct TimeScale {
    pub left_px: f32,
    pub start_time: Timestamp,
    pub px_per_ms: f64,
}

impl TimeScale {
    pub fn new(left_px: f32, start_time: Timestamp, px_per_ms: f64) -> Self {
        Self { left_px, start_time, px_per_ms: px_per_ms.max(1e-12) }
    }

    /// Scale mapping `[start, end]` onto `[left_px, right_px]`.
    pub fn fit(left_px: f32, right_px: f32, start: Timestamp, end: Timestamp) -> Self {
        let span = (end - start).max(1) as f64;
        Self::new(left_px, start, (right_px - left_px).max(1.0) as f64 / span)
    }

    #[inline]
    pub fn to_px(&self, t: Timestamp) -> f32 {
        self.left_px + ((t - self.start_time) as f64 * self.px_per_ms) as f32
    }

    #[inline]
    pub fn from_px(&self, px: f32) -> Timestamp {
        self.start_time + (((px - self.left_px) as f64) / self.px_per_ms).round() as i64
    }

    /// Scroll content by `dx_px` (positive moves content right, revealing older bars).
    pub fn pan_px(&mut self, dx_px: f32) {
        self.start_time -= ((dx_px as f64) / self.px_per_ms).round() as i64;
    }
}

/// Vertical price scale mapping `[vmin, vmax]` to `[bottom_px, top_px]`.
#[derive(Clone, Copy, Debug)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: Price,
    pub vmax: Price,
    pub log: bool,
}

impl ValueScale {
    pub fn new_linear(top_px: f32, bottom_px: f32, vmin: Price, mut vmax: Price) -> Self {
        if (vmax - vmin).abs() < 1e-12 { vmax = vmin + 1.0; }
        Self { top_px, bottom_px, vmin, vmax, log: false }
    }

    pub fn new_log10(top_px: f32, bottom_px: f32, mut vmin: Price, mut vmax: Price) -> Self {
        // Ensure strictly positive range for log scale
        let eps = 1e-12;
        vmin = if vmin <= eps { eps } else { vmin };
        vmax = if vmax <= vmin { vmin * 10.0 } else { vmax };
        Self { top_px, bottom_px, vmin, vmax, log: true }
    }

    fn domain(&self, v: Price) -> f64 {
        if self.log { v.max(1e-12).log10() } else { v }
    }

    #[inline]
    pub fn to_px(&self, v: Price) -> f32 {
        let lo = self.domain(self.vmin);
        let span = (self.domain(self.vmax) - lo).max(1e-12);
        self.bottom_px - ((self.domain(v) - lo) / span) as f32 * (self.bottom_px - self.top_px)
    }

    #[inline]
    pub fn from_px(&self, py: f32) -> Price {
        let lo = self.domain(self.vmin);
        let span = (self.domain(self.vmax) - lo).max(1e-12);
        let frac = ((self.bottom_px - py) / (self.bottom_px - self.top_px)) as f64;
        let d = lo + frac * span;
        if self.log { 10f64.powf(d) } else { d }
    }
}
