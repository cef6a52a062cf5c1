// File: crates/opening-range-core/src/series.rs
// Summary: Bar model, bar sizes, time-ordered bar series and session-aligned resampling.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::calendar::TradingCalendar;
use crate::error::{OpeningRangeError, Result};
use crate::types::{Price, Timestamp, MS_PER_MINUTE};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

impl Bar {
    /// Try to construct a bar enforcing OHLC invariants:
    /// l <= min(o,c), h >= max(o,c), l <= h and start < end.
    pub fn try_new(
        start_time: Timestamp,
        end_time: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
    ) -> Result<Self> {
        let invalid = |reason| OpeningRangeError::InvalidBar { start: start_time, reason };
        if end_time <= start_time { return Err(invalid("end not after start")); }
        if low > open.min(close) { return Err(invalid("low above min(open,close)")); }
        if high < open.max(close) { return Err(invalid("high below max(open,close)")); }
        if low > high { return Err(invalid("low above high")); }
        Ok(Self { start_time, end_time, open, high, low, close })
    }
}

/// Linear bar duration in whole minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BarSize {
    minutes: u32,
}

impl BarSize {
    pub const DAY: BarSize = BarSize { minutes: 1440 };

    pub fn minutes(minutes: u32) -> Result<Self> {
        if minutes == 0 { return Err(OpeningRangeError::InvalidBarSize); }
        Ok(Self { minutes })
    }

    pub const fn as_minutes(&self) -> u32 { self.minutes }
    pub const fn millis(&self) -> i64 { self.minutes as i64 * MS_PER_MINUTE }
    pub const fn is_day(&self) -> bool { self.minutes == Self::DAY.minutes }

    /// Short label used in study labels: "30m", "2h", "1D".
    pub fn label(&self) -> String {
        if self.is_day() {
            "1D".to_string()
        } else if self.minutes % 60 == 0 {
            format!("{}h", self.minutes / 60)
        } else {
            format!("{}m", self.minutes)
        }
    }
}

impl TryFrom<u32> for BarSize {
    type Error = OpeningRangeError;
    fn try_from(minutes: u32) -> Result<Self> { Self::minutes(minutes) }
}

impl From<BarSize> for u32 {
    fn from(size: BarSize) -> u32 { size.minutes }
}

/// Bars in ascending start-time order.
#[derive(Clone, Debug, Default)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new() -> Self { Self { bars: Vec::new() } }

    pub fn from_bars(bars: Vec<Bar>) -> Result<Self> {
        let mut s = Self { bars: Vec::with_capacity(bars.len()) };
        for b in bars { s.push(b)?; }
        Ok(s)
    }

    /// Append a bar; rejects bars that do not start after the current last bar.
    pub fn push(&mut self, bar: Bar) -> Result<()> {
        if let Some(last) = self.bars.last() {
            if bar.start_time <= last.start_time {
                return Err(OpeningRangeError::OutOfOrder { start: bar.start_time, last: last.start_time });
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    pub fn len(&self) -> usize { self.bars.len() }
    pub fn is_empty(&self) -> bool { self.bars.is_empty() }
    pub fn bars(&self) -> &[Bar] { &self.bars }
    pub fn get(&self, i: usize) -> Option<&Bar> { self.bars.get(i) }
    pub fn last(&self) -> Option<&Bar> { self.bars.last() }
    pub fn last_index(&self) -> Option<usize> { self.bars.len().checked_sub(1) }

    pub fn start_time(&self, i: usize) -> Option<Timestamp> { self.bars.get(i).map(|b| b.start_time) }
    pub fn end_time(&self, i: usize) -> Option<Timestamp> { self.bars.get(i).map(|b| b.end_time) }
    pub fn high(&self, i: usize) -> Option<Price> { self.bars.get(i).map(|b| b.high) }
    pub fn low(&self, i: usize) -> Option<Price> { self.bars.get(i).map(|b| b.low) }

    /// Time span from the first bar's start to the last bar's end.
    pub fn time_span(&self) -> Option<(Timestamp, Timestamp)> {
        Some((self.bars.first()?.start_time, self.bars.last()?.end_time))
    }

    /// Price span (min low, max high) of bars starting inside `[from, to]`.
    pub fn price_span(&self, from: Timestamp, to: Timestamp) -> Option<(Price, Price)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for b in self.bars.iter().filter(|b| b.start_time >= from && b.start_time <= to) {
            lo = lo.min(b.low);
            hi = hi.max(b.high);
        }
        if lo.is_finite() && hi.is_finite() { Some((lo, hi)) } else { None }
    }

    /// Aggregate into coarser bars aligned to each trading day's session open.
    /// For each bucket: open=first.open, close=last.close, high=max high, low=min low.
    pub fn resample(&self, size: BarSize, calendar: &dyn TradingCalendar) -> BarSeries {
        let mut out = BarSeries::new();
        let mut current: Option<Bar> = None;
        for b in &self.bars {
            let (start, end) = bucket_bounds(b.start_time, size, calendar);
            match current.as_mut() {
                Some(acc) if acc.start_time == start => {
                    acc.high = acc.high.max(b.high);
                    acc.low = acc.low.min(b.low);
                    acc.close = b.close;
                }
                _ => {
                    if let Some(done) = current.take() { out.push_bucket(done); }
                    current = Some(Bar { start_time: start, end_time: end, open: b.open, high: b.high, low: b.low, close: b.close });
                }
            }
        }
        if let Some(done) = current { out.push_bucket(done); }
        out
    }

    fn push_bucket(&mut self, bar: Bar) {
        if let Err(e) = self.push(bar) {
            warn!("resample dropped bucket: {e}");
        }
    }
}

fn bucket_bounds(t: Timestamp, size: BarSize, calendar: &dyn TradingCalendar) -> (Timestamp, Timestamp) {
    let day_start = calendar.start_of_day(t);
    let day_end = calendar.end_of_day(t);
    if size.is_day() {
        return (day_start, day_end);
    }
    let len = size.millis();
    let start = day_start + (t - day_start) / len * len;
    // bars after the session close keep full-length buckets
    let end = if start < day_end { (start + len).min(day_end) } else { start + len };
    (start, end)
}
