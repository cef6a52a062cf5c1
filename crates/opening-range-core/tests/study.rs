// File: crates/opening-range-core/tests/study.rs
// Purpose: Study lifecycle: figure management, published values, show-all vs current-only modes.

mod common;

use std::sync::Arc;

use common::*;
use opening_range_core::{
    BarSeries, DataContext, DayKey, Instrument, OpeningRangeConfig, OpeningRangeStudy, Study, ValueKey, ValueStore,
};

struct Feed {
    days: BarSeries,
    opening: BarSeries,
    instrument: Instrument,
    values: ValueStore,
}

impl Feed {
    fn new(days: usize) -> Self {
        Self {
            days: day_series(days),
            opening: opening_series(days, 4),
            instrument: Instrument::default(),
            values: ValueStore::new(),
        }
    }

    fn run(&mut self, study: &OpeningRangeStudy) {
        let mut ctx = DataContext {
            day_series: &self.days,
            opening_series: &self.opening,
            primary: &self.opening,
            instrument: &self.instrument,
            values: &mut self.values,
        };
        study.on_bar_close(&mut ctx);
    }
}

#[test]
fn show_all_days_builds_one_figure_per_day() {
    let study = OpeningRangeStudy::new(OpeningRangeConfig::default());
    let mut feed = Feed::new(4);
    feed.run(&study);

    // first loaded day is skipped
    assert_eq!(study.figure_count(), 3);
    assert_eq!(study.aggregator().len(), 3);

    let last = feed.opening.last_index().unwrap();
    assert_eq!(feed.values.get(last, ValueKey::OpenHigh), Some(103.5));
    assert_eq!(feed.values.get(last, ValueKey::OpenLow), Some(102.5));

    // a second pass over the same data changes nothing
    feed.run(&study);
    assert_eq!(study.figure_count(), 3);
}

#[test]
fn current_day_only_keeps_a_single_figure() {
    let mut cfg = OpeningRangeConfig::default();
    cfg.show_all_days = false;
    let study = OpeningRangeStudy::new(cfg);
    let mut feed = Feed::new(3);

    feed.run(&study);
    feed.run(&study);
    assert_eq!(study.aggregator().len(), 1);
    let figs = study.figures();
    assert_eq!(figs.len(), 1);
    assert_eq!(figs[0].day_key(), DayKey(T0 + 2 * DAY));
}

#[test]
fn only_latest_figure_extends_right() {
    let study = OpeningRangeStudy::new(OpeningRangeConfig::default());
    let mut feed = Feed::new(3);
    feed.run(&study);
    let figs = study.figures();
    assert_eq!(figs.iter().filter(|f| f.extend_lines()).count(), 1);
    assert!(figs.last().unwrap().extend_lines());

    let mut cfg = OpeningRangeConfig::default();
    cfg.extend_lines_right = false;
    let study = OpeningRangeStudy::new(cfg);
    feed.run(&study);
    assert!(study.figures().iter().all(|f| !f.extend_lines()));
}

#[test]
fn nothing_published_without_ranges() {
    let study = OpeningRangeStudy::new(OpeningRangeConfig::default());
    let mut feed = Feed::new(3);
    feed.opening = BarSeries::new();
    feed.run(&study);
    assert!(feed.values.is_empty());
    assert_eq!(study.figure_count(), 0);
    assert!(study.indicator_markers().is_empty());
}

#[test]
fn clear_state_discards_figures() {
    let mut study = OpeningRangeStudy::new(OpeningRangeConfig::default());
    let mut feed = Feed::new(3);
    feed.run(&study);
    assert_eq!(study.figure_count(), 2);

    study.clear_state();
    assert_eq!(study.figure_count(), 0);
    assert!(study.latest_range().is_none());

    let mut cfg = OpeningRangeConfig::default();
    cfg.opening_period = opening_range_core::BarSize::minutes(60).unwrap();
    feed.run(&study);
    study.apply_config(cfg);
    assert_eq!(study.figure_count(), 0);
    assert_eq!(study.label(), "OR(1h)");
}

#[test]
fn hit_test_and_selection() {
    let study = OpeningRangeStudy::new(OpeningRangeConfig::default());
    let mut feed = Feed::new(3);
    feed.run(&study);

    // days 1 and 2 on screen, prices 100..110
    let vp = viewport_over(T0 + DAY, T0 + 3 * DAY, 100.0, 110.0);
    study.layout_figures(&vp);

    // day 1 high 101.5 -> y 340; x spans 0..400
    let hit = study.hit_test(200.0, 341.0);
    assert_eq!(hit, Some(DayKey(T0 + DAY)));
    assert_eq!(study.hit_test(200.0, 10.0), None);

    study.select(hit);
    let figs = study.figures();
    assert!(figs[0].is_selected());
    assert!(!figs[1].is_selected());

    let mut canvas = RecordingCanvas::default();
    study.draw_figures(&mut canvas, &feed.instrument);
    assert_eq!(canvas.texts().len(), 4);
}

#[test]
fn exported_values_and_markers() {
    let mut cfg = OpeningRangeConfig::default();
    cfg.low_indicator.enabled = false;
    let study = OpeningRangeStudy::new(cfg);
    assert_eq!(study.label(), "OR(30m)");
    let labels: Vec<_> = study.exported_values().iter().map(|v| v.label).collect();
    assert_eq!(labels, ["Open High", "Open Low"]);

    let mut feed = Feed::new(2);
    feed.run(&study);
    let markers = study.indicator_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].0, ValueKey::OpenHigh);
    assert_eq!(markers[0].1, 101.5);
}

#[test]
fn value_store_series_are_ordered() {
    let mut values = ValueStore::new();
    values.set(5, ValueKey::OpenHigh, 2.0);
    values.set(1, ValueKey::OpenHigh, 1.0);
    values.set(3, ValueKey::OpenLow, 0.5);
    assert_eq!(values.series(ValueKey::OpenHigh), vec![(1, 1.0), (5, 2.0)]);
    assert_eq!(values.series(ValueKey::OpenLow), vec![(3, 0.5)]);
}

#[test]
fn data_and_render_callbacks_from_different_threads() {
    let study = Arc::new(OpeningRangeStudy::new(OpeningRangeConfig::default()));
    let vp = viewport_over(T0, T0 + 8 * DAY, 95.0, 115.0);

    std::thread::scope(|s| {
        let data = Arc::clone(&study);
        s.spawn(move || {
            let mut feed = Feed::new(8);
            for _ in 0..20 {
                feed.run(&data);
            }
        });
        let render = Arc::clone(&study);
        s.spawn(move || {
            for _ in 0..20 {
                render.layout_figures(&vp);
                let mut canvas = RecordingCanvas::default();
                render.draw_figures(&mut canvas, &Instrument::default());
                let _ = render.hit_test(100.0, 100.0);
            }
        });
    });
    assert_eq!(study.figure_count(), 7);
}
