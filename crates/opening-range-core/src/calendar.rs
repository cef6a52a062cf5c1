// File: crates/opening-range-core/src/calendar.rs
// Summary: Trading calendar: session-aware start/end of day and instrument price formatting.
// Notes:
// - Day boundaries are computed in the instrument's IANA time zone, so DST shifts move
//   the UTC instant of the session open but never split a trading day.
// - Nonexistent wall times (spring-forward) shift forward minute by minute; ambiguous
//   wall times (fall-back) resolve to the earliest instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{OpeningRangeError, Result};
use crate::types::{DayKey, Price, Timestamp};

/// Normalizes timestamps to trading-day boundaries.
pub trait TradingCalendar {
    /// Most recent session open at or before `t`.
    fn start_of_day(&self, t: Timestamp) -> Timestamp;
    /// Session close of the trading day containing `t`.
    fn end_of_day(&self, t: Timestamp) -> Timestamp;

    fn day_key(&self, t: Timestamp) -> DayKey { DayKey(self.start_of_day(t)) }
}

/// Session hours in local wall time. `close == open` is a 24h session;
/// `close < open` wraps past midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Session {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self { Self { open, close } }

    pub fn full_day() -> Self {
        Self { open: NaiveTime::MIN, close: NaiveTime::MIN }
    }

    /// Parse "HH:MM" open/close strings.
    pub fn parse(open: &str, close: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s.trim(), "%H:%M")
                .map_err(|_| OpeningRangeError::InvalidConfig(format!("bad session time {s:?}, expected HH:MM")))
        };
        Ok(Self::new(parse(open)?, parse(close)?))
    }

    pub fn is_24h(&self) -> bool { self.open == self.close }
}

impl Default for Session {
    fn default() -> Self { Self::full_day() }
}

#[derive(Clone, Debug)]
pub struct Instrument {
    pub symbol: String,
    pub tick_size: Price,
    pub time_zone: Tz,
    pub session: Session,
}

impl Instrument {
    /// UTC, 24h session, 0.01 tick.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), tick_size: 0.01, time_zone: Tz::UTC, session: Session::full_day() }
    }

    pub fn with_time_zone(mut self, name: &str) -> Result<Self> {
        self.time_zone = name
            .parse::<Tz>()
            .map_err(|_| OpeningRangeError::UnknownTimeZone(name.to_string()))?;
        Ok(self)
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_tick_size(mut self, tick_size: Price) -> Self {
        if tick_size > 0.0 && tick_size.is_finite() { self.tick_size = tick_size; }
        self
    }

    /// Number of decimals implied by the tick size (0.25 -> 2, 0.0001 -> 4, 1 -> 0).
    pub fn decimals(&self) -> usize {
        let mut x = self.tick_size;
        let mut d = 0;
        while (x - x.round()).abs() > 1e-9 && d < 10 {
            x *= 10.0;
            d += 1;
        }
        d
    }

    /// Round to the tick size and print with the tick's precision.
    pub fn format(&self, price: Price) -> String {
        let rounded = (price / self.tick_size).round() * self.tick_size;
        format!("{:.*}", self.decimals(), rounded)
    }

    /// Local calendar date on which the session containing `t` opened.
    /// Compared as instants: during a repeated hour the wall clock runs backwards.
    fn session_date(&self, t: Timestamp) -> Option<NaiveDate> {
        let date = DateTime::from_timestamp_millis(t)?.with_timezone(&self.time_zone).date_naive();
        if t < self.resolve(date.and_time(self.session.open)) { date.pred_opt() } else { Some(date) }
    }

    fn resolve(&self, naive: NaiveDateTime) -> Timestamp {
        let mut t = naive;
        // cap at 2 hours
        for _ in 0..=120 {
            match self.time_zone.from_local_datetime(&t) {
                LocalResult::Single(dt) => return dt.timestamp_millis(),
                LocalResult::Ambiguous(a, _) => return a.timestamp_millis(),
                LocalResult::None => t += Duration::minutes(1),
            }
        }
        naive.and_utc().timestamp_millis()
    }
}

impl Default for Instrument {
    fn default() -> Self { Self::new("") }
}

impl TradingCalendar for Instrument {
    fn start_of_day(&self, t: Timestamp) -> Timestamp {
        match self.session_date(t) {
            Some(date) => self.resolve(date.and_time(self.session.open)),
            None => t,
        }
    }

    fn end_of_day(&self, t: Timestamp) -> Timestamp {
        let Some(date) = self.session_date(t) else { return t };
        let next = date.succ_opt().unwrap_or(date);
        let s = self.session;
        if s.is_24h() {
            self.resolve(next.and_time(s.open))
        } else if s.close > s.open {
            self.resolve(date.and_time(s.close))
        } else {
            self.resolve(next.and_time(s.close))
        }
    }
}
