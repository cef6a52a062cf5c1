// File: crates/opening-range-core/tests/calendar.rs
// Purpose: Session-aware day boundaries (including DST) and tick-size price formatting.

mod common;

use common::*;
use opening_range_core::calendar::{Instrument, Session, TradingCalendar};
use opening_range_core::{DayKey, OpeningRangeError};

/// 2024-03-08 14:30Z == 09:30 New York (EST).
const NY_OPEN_FRI: i64 = 1_709_908_200_000;
/// 2024-03-11 13:30Z == 09:30 New York (EDT, after the March 10 switch).
const NY_OPEN_MON: i64 = 1_710_163_800_000;

fn new_york_rth() -> Instrument {
    Instrument::new("ES")
        .with_time_zone("America/New_York")
        .unwrap()
        .with_session(Session::parse("09:30", "16:00").unwrap())
        .with_tick_size(0.25)
}

#[test]
fn utc_full_day_boundaries() {
    let instr = Instrument::default();
    assert_eq!(instr.start_of_day(T0), T0);
    assert_eq!(instr.start_of_day(T0 + 5 * 60 * MIN), T0);
    assert_eq!(instr.start_of_day(T0 + DAY - 1), T0);
    assert_eq!(instr.end_of_day(T0), T0 + DAY);
    assert_eq!(instr.day_key(T0 + 90 * MIN), DayKey(T0));
}

#[test]
fn regular_session_in_exchange_time_zone() {
    let instr = new_york_rth();
    assert_eq!(instr.start_of_day(NY_OPEN_FRI + 30 * MIN), NY_OPEN_FRI);
    assert_eq!(instr.end_of_day(NY_OPEN_FRI), NY_OPEN_FRI + 390 * MIN);
    // 08:00 local belongs to the previous day's session
    assert_eq!(instr.start_of_day(NY_OPEN_FRI - 90 * MIN), NY_OPEN_FRI - DAY);
}

#[test]
fn session_open_follows_daylight_saving() {
    let instr = new_york_rth();
    assert_eq!(instr.start_of_day(NY_OPEN_MON + 30 * MIN), NY_OPEN_MON);
    // one hour less than three calendar days after Friday's open
    assert_eq!(NY_OPEN_MON - NY_OPEN_FRI, 3 * DAY - 60 * MIN);
}

/// 2024-11-03 01:30 EDT, the first pass through the repeated hour.
const NY_FALL_BACK_OPEN: i64 = 1_730_611_800_000;
/// 2024-11-02 01:30 EDT.
const NY_PREV_OPEN: i64 = 1_730_525_400_000;

fn new_york_from(open: &str) -> Instrument {
    Instrument::new("NQ")
        .with_time_zone("America/New_York")
        .unwrap()
        .with_session(Session::parse(open, open).unwrap())
}

#[test]
fn open_in_repeated_hour_resolves_to_earliest_instant() {
    let instr = new_york_from("01:30");
    // 01:45 EDT and 01:15 EST are both after the open; 01:15 EST reads earlier on the wall
    assert_eq!(instr.start_of_day(NY_FALL_BACK_OPEN + 15 * MIN), NY_FALL_BACK_OPEN);
    assert_eq!(instr.start_of_day(NY_FALL_BACK_OPEN + 45 * MIN), NY_FALL_BACK_OPEN);
    // 01:15 EDT precedes the open
    assert_eq!(instr.start_of_day(NY_FALL_BACK_OPEN - 15 * MIN), NY_PREV_OPEN);
    // the day holds 25 hours; next open is 01:30 EST
    assert_eq!(instr.end_of_day(NY_FALL_BACK_OPEN), NY_FALL_BACK_OPEN + DAY + 60 * MIN);
}

#[test]
fn day_keys_never_go_backwards_across_fall_back() {
    let instr = new_york_from("01:30");
    let mut last = i64::MIN;
    let mut t = NY_PREV_OPEN;
    while t < NY_FALL_BACK_OPEN + DAY + 3 * 60 * MIN {
        let key = instr.start_of_day(t);
        assert!(key >= last, "day key went backwards at {t}");
        assert!(key <= t);
        last = key;
        t += 5 * MIN;
    }
}

#[test]
fn open_in_spring_forward_gap_shifts_to_first_valid_minute() {
    let instr = new_york_from("02:30");
    // 02:30 does not exist on 2024-03-10; the session opens at 03:00 EDT (07:00Z)
    let open = 1_710_054_000_000;
    assert_eq!(instr.start_of_day(open + 30 * MIN), open);
    assert_eq!(instr.start_of_day(open), open);
    // 00:45 EST belongs to the March 9 session (02:30 EST, 07:30Z)
    assert_eq!(instr.start_of_day(open - 75 * MIN), 1_709_969_400_000);
}

#[test]
fn overnight_session_wraps_midnight() {
    let instr = Instrument::new("CL").with_session(Session::parse("18:00", "17:00").unwrap());
    let t = T0 + 2 * 60 * MIN;
    assert_eq!(instr.start_of_day(t), T0 - 6 * 60 * MIN);
    assert_eq!(instr.end_of_day(t), T0 + 17 * 60 * MIN);
    assert_eq!(instr.start_of_day(T0 + 18 * 60 * MIN), T0 + 18 * 60 * MIN);
}

#[test]
fn formats_to_tick_precision() {
    assert_eq!(new_york_rth().format(4512.13), "4512.25");
    assert_eq!(Instrument::default().format(105.2), "105.20");
    assert_eq!(Instrument::new("X").with_tick_size(1.0).format(104.6), "105");
    assert_eq!(Instrument::new("X").with_tick_size(0.0001).decimals(), 4);
    // non-positive tick sizes are ignored
    assert_eq!(Instrument::new("X").with_tick_size(0.0).tick_size, 0.01);
}

#[test]
fn rejects_unknown_zone_and_bad_session() {
    assert!(matches!(
        Instrument::new("X").with_time_zone("Mars/Olympus"),
        Err(OpeningRangeError::UnknownTimeZone(_))
    ));
    assert!(Session::parse("9h30", "16:00").is_err());
    assert!(Session::full_day().is_24h());
}
