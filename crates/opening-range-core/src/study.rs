// File: crates/opening-range-core/src/study.rs
// Summary: Host glue: study lifecycle hooks, published values and the figure set.

use std::collections::BTreeMap;

use log::debug;
use parking_lot::Mutex;

use crate::aggregator::{AggregatorEvent, RangeAggregator, RangeRecord, ResetMode};
use crate::calendar::Instrument;
use crate::canvas::Canvas;
use crate::config::OpeningRangeConfig;
use crate::figure::{Drawable, RangeFigure};
use crate::series::BarSeries;
use crate::style::{IndicatorStyle, RangeStyle};
use crate::types::{DayKey, Price};
use crate::view::DrawContext;

/// Values a study publishes on the primary series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKey {
    OpenHigh,
    OpenLow,
}

impl ValueKey {
    pub fn label(&self) -> &'static str {
        match self {
            ValueKey::OpenHigh => "Open High",
            ValueKey::OpenLow => "Open Low",
        }
    }
}

/// Published values keyed by primary-series bar index.
#[derive(Clone, Debug, Default)]
pub struct ValueStore {
    values: BTreeMap<(ValueKey, usize), f64>,
}

impl ValueStore {
    pub fn new() -> Self { Self::default() }

    pub fn set(&mut self, index: usize, key: ValueKey, value: f64) {
        self.values.insert((key, index), value);
    }

    pub fn get(&self, index: usize, key: ValueKey) -> Option<f64> {
        self.values.get(&(key, index)).copied()
    }

    /// All (index, value) pairs for `key` in index order; other indicators read this as a source.
    pub fn series(&self, key: ValueKey) -> Vec<(usize, f64)> {
        self.values.range((key, 0)..=(key, usize::MAX)).map(|(&(_, i), &v)| (i, v)).collect()
    }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn clear(&mut self) { self.values.clear(); }
}

/// Everything the host hands a study for one calculation cycle.
pub struct DataContext<'a> {
    pub day_series: &'a BarSeries,
    pub opening_series: &'a BarSeries,
    pub primary: &'a BarSeries,
    pub instrument: &'a Instrument,
    pub values: &'a mut ValueStore,
}

/// Exported reference line other indicators may consume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportedValue {
    pub key: ValueKey,
    pub label: &'static str,
    pub indicator: IndicatorStyle,
}

/// Lifecycle hooks the host calls.
pub trait Study {
    fn id(&self) -> &'static str;
    fn label(&self) -> String;
    /// Discard internal state; settings, bar size or loaded history changed.
    fn clear_state(&self);
    fn on_bar_close(&self, ctx: &mut DataContext<'_>) { self.calculate_values(ctx) }
    fn calculate_values(&self, ctx: &mut DataContext<'_>);
}

pub struct OpeningRangeStudy {
    config: OpeningRangeConfig,
    style: RangeStyle,
    aggregator: RangeAggregator,
    figures: Mutex<BTreeMap<DayKey, RangeFigure>>,
}

impl OpeningRangeStudy {
    pub fn new(config: OpeningRangeConfig) -> Self {
        let style = config.range_style();
        Self { config, style, aggregator: RangeAggregator::new(), figures: Mutex::new(BTreeMap::new()) }
    }

    pub fn config(&self) -> &OpeningRangeConfig { &self.config }
    pub fn style(&self) -> &RangeStyle { &self.style }
    pub fn aggregator(&self) -> &RangeAggregator { &self.aggregator }

    /// Replace the settings; all ranges and figures are rebuilt on the next cycle.
    pub fn apply_config(&mut self, config: OpeningRangeConfig) {
        self.style = config.range_style();
        self.config = config;
        self.clear_state();
    }

    pub fn exported_values(&self) -> [ExportedValue; 2] {
        [
            ExportedValue { key: ValueKey::OpenHigh, label: ValueKey::OpenHigh.label(), indicator: self.config.high_indicator },
            ExportedValue { key: ValueKey::OpenLow, label: ValueKey::OpenLow.label(), indicator: self.config.low_indicator },
        ]
    }

    /// Latest range as price-axis markers, for enabled indicators only.
    pub fn indicator_markers(&self) -> Vec<(ValueKey, Price, IndicatorStyle)> {
        let Some(r) = self.aggregator.get_latest_range() else { return Vec::new() };
        [(ValueKey::OpenHigh, r.high, self.config.high_indicator), (ValueKey::OpenLow, r.low, self.config.low_indicator)]
            .into_iter()
            .filter(|(_, _, s)| s.enabled)
            .collect()
    }

    /// Apply queued aggregator events to the figure set.
    fn sync_figures(&self) {
        let events = self.aggregator.drain_events();
        let latest = self.aggregator.get_latest_range().map(|r| r.day_key);
        let mut figures = self.figures.lock();
        for evt in events {
            match evt {
                AggregatorEvent::FiguresCleared => figures.clear(),
                AggregatorEvent::FigureCreated(record) => {
                    figures.insert(record.day_key, RangeFigure::new(record));
                }
            }
        }
        // only the current day reaches the right edge
        for (key, fig) in figures.iter_mut() {
            fig.set_extend_lines(self.config.extend_lines_right && Some(*key) == latest);
        }
    }

    pub fn layout_figures(&self, ctx: &dyn DrawContext) {
        for fig in self.figures.lock().values_mut() {
            fig.layout(ctx);
        }
    }

    pub fn draw_figures(&self, canvas: &mut dyn Canvas, instrument: &Instrument) {
        for fig in self.figures.lock().values() {
            fig.draw(canvas, &self.style, instrument);
        }
    }

    /// Day of the most recent figure under (`x`, `y`).
    pub fn hit_test(&self, x: f32, y: f32) -> Option<DayKey> {
        self.figures
            .lock()
            .values()
            .rev()
            .find(|f| f.contains(x, y, &self.style))
            .map(RangeFigure::day_key)
    }

    /// Select one figure (or none); every other figure is deselected.
    pub fn select(&self, day: Option<DayKey>) {
        for (key, fig) in self.figures.lock().iter_mut() {
            fig.set_selected(Some(*key) == day);
        }
    }

    /// Copies of the current figures in day order.
    pub fn figures(&self) -> Vec<RangeFigure> {
        self.figures.lock().values().cloned().collect()
    }

    pub fn figure_count(&self) -> usize { self.figures.lock().len() }

    pub fn latest_range(&self) -> Option<RangeRecord> { self.aggregator.get_latest_range() }
}

impl Study for OpeningRangeStudy {
    fn id(&self) -> &'static str { "opening_range" }

    fn label(&self) -> String { format!("OR({})", self.config.opening_period.label()) }

    fn clear_state(&self) {
        self.aggregator.clear_state();
        self.sync_figures();
    }

    fn calculate_values(&self, ctx: &mut DataContext<'_>) {
        // the first loaded day is usually a truncated session
        let start = if self.config.show_all_days {
            1
        } else {
            self.aggregator.reset(ResetMode::CurrentOnly);
            ctx.day_series.len().saturating_sub(1)
        };
        for bar in ctx.day_series.bars().iter().skip(start) {
            self.aggregator.on_day_close(bar, ctx.opening_series, ctx.instrument);
        }
        self.sync_figures();

        let Some(latest) = self.aggregator.get_latest_range() else { return };
        let Some(index) = ctx.primary.last_index() else { return };
        ctx.values.set(index, ValueKey::OpenHigh, latest.high);
        ctx.values.set(index, ValueKey::OpenLow, latest.low);
        debug!("published {} high={} low={} at bar {index}", self.label(), latest.high, latest.low);
    }
}
