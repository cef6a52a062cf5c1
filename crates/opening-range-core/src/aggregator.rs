// File: crates/opening-range-core/src/aggregator.rs
// Summary: Maps day-close events onto one opening high/low range per trading day.
// Notes:
// - Records, the opening-series cursor and the latest day key share one mutex. It is held
//   only for a lookup/insert/clear, never while a figure lays out or draws.
// - The cursor only moves forward between resets, so a full backfill scans the opening
//   series once.

use std::collections::BTreeMap;

use log::{debug, info, trace};
use parking_lot::Mutex;

use crate::calendar::TradingCalendar;
use crate::series::{Bar, BarSeries};
use crate::types::{DayKey, Price, Timestamp};

/// Opening range of one trading day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeRecord {
    pub day_key: DayKey,
    pub window_end: Timestamp,
    pub high: Price,
    pub low: Price,
    pub extend_to_right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetMode {
    /// Drop everything and rewind the cursor; the whole history is re-derived next.
    KeepAll,
    /// Drop records but keep the cursor; only the most recent day is re-derived next.
    CurrentOnly,
}

/// Notifications for the rendering host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AggregatorEvent {
    FigureCreated(RangeRecord),
    FiguresCleared,
}

#[derive(Default)]
struct State {
    records: BTreeMap<DayKey, RangeRecord>,
    cursor: usize,
    latest: Option<DayKey>,
    events: Vec<AggregatorEvent>,
}

/// One per chart/instrument; created when the study attaches.
#[derive(Default)]
pub struct RangeAggregator {
    state: Mutex<State>,
}

impl RangeAggregator {
    pub fn new() -> Self { Self::default() }

    /// Register the opening range for the day `day_bar` starts in.
    ///
    /// Returns the new record, or None when the day is already recorded or the opening
    /// series has no bar at/after the day boundary yet (the day is retried on a later call).
    pub fn on_day_close(
        &self,
        day_bar: &Bar,
        opening: &BarSeries,
        calendar: &dyn TradingCalendar,
    ) -> Option<RangeRecord> {
        let day_key = calendar.day_key(day_bar.start_time);
        let mut st = self.state.lock();
        if st.records.contains_key(&day_key) {
            trace!("opening range for {day_key} already recorded");
            return None;
        }

        let bars = opening.bars();
        let mut j = st.cursor;
        while j < bars.len() && bars[j].start_time < day_key.timestamp() {
            j += 1;
        }
        st.cursor = j;
        let Some(open_bar) = bars.get(j) else {
            trace!("no opening bar at/after {day_key} yet ({} loaded)", bars.len());
            return None;
        };

        let record = RangeRecord {
            day_key,
            window_end: calendar.end_of_day(day_key.timestamp()),
            high: open_bar.high,
            low: open_bar.low,
            extend_to_right: false,
        };
        st.records.insert(day_key, record);
        if st.latest.map_or(true, |k| day_key > k) {
            st.latest = Some(day_key);
        }
        st.events.push(AggregatorEvent::FigureCreated(record));
        debug!("opening range {day_key}: high={} low={}", record.high, record.low);
        Some(record)
    }

    /// Record with the greatest day key, if any.
    pub fn get_latest_range(&self) -> Option<RangeRecord> {
        let st = self.state.lock();
        st.latest.and_then(|k| st.records.get(&k).copied())
    }

    pub fn reset(&self, mode: ResetMode) {
        let mut st = self.state.lock();
        let dropped = st.records.len();
        st.records.clear();
        st.latest = None;
        if mode == ResetMode::KeepAll {
            st.cursor = 0;
        }
        st.events.push(AggregatorEvent::FiguresCleared);
        info!("opening ranges reset ({mode:?}), dropped {dropped} record(s)");
    }

    /// Discard all state; used when settings, bar size or loaded history change.
    pub fn clear_state(&self) { self.reset(ResetMode::KeepAll) }

    pub fn get(&self, day_key: DayKey) -> Option<RangeRecord> {
        self.state.lock().records.get(&day_key).copied()
    }

    /// Copies of all records in ascending day order.
    pub fn records(&self) -> Vec<RangeRecord> {
        self.state.lock().records.values().copied().collect()
    }

    pub fn len(&self) -> usize { self.state.lock().records.len() }
    pub fn is_empty(&self) -> bool { self.state.lock().records.is_empty() }

    /// Index of the next opening bar the scan will inspect.
    pub fn cursor(&self) -> usize { self.state.lock().cursor }

    /// Take all queued events, oldest first.
    pub fn drain_events(&self) -> Vec<AggregatorEvent> {
        std::mem::take(&mut self.state.lock().events)
    }
}
