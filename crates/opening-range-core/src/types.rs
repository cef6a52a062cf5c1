// File: crates/opening-range-core/src/types.rs
// Summary: Shared types and constants (timestamps, day keys, pixel tolerances).

use std::fmt;

use chrono::DateTime;

/// Milliseconds since the Unix epoch (UTC).
pub type Timestamp = i64;
/// Price value (e.g., high/low of a bar).
pub type Price = f64;

pub const MS_PER_MINUTE: i64 = 60_000;

/// Hit-test tolerance for range lines, in pixels (exclusive).
pub const HIT_TOLERANCE_PX: f32 = 6.0;
/// Gap kept between a shifted label and the right edge of the viewport.
pub const LABEL_EDGE_GAP_PX: f32 = 5.0;
/// Labels sit this many pixels above their line.
pub const LABEL_BASELINE_OFFSET_PX: f32 = 3.0;

/// Start-of-trading-day timestamp identifying one day's opening range.
/// Contract: always produced by `TradingCalendar::start_of_day`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(pub Timestamp);

impl DayKey {
    pub const fn timestamp(&self) -> Timestamp { self.0 }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%MZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}
