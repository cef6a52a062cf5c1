// File: crates/opening-range-core/src/lib.rs
// Summary: Core library entry point; exports the opening range aggregator, figure and study API.

pub mod aggregator;
pub mod calendar;
pub mod canvas;
pub mod config;
pub mod error;
pub mod figure;
pub mod geometry;
pub mod scale;
pub mod series;
pub mod study;
pub mod style;
pub mod types;
pub mod view;

pub use aggregator::{AggregatorEvent, RangeAggregator, RangeRecord, ResetMode};
pub use calendar::{Instrument, Session, TradingCalendar};
pub use canvas::Canvas;
pub use config::{InstrumentConfig, OpeningRangeConfig};
pub use error::{OpeningRangeError, Result};
pub use figure::{Drawable, FigureState, Projection, RangeFigure};
pub use geometry::{Point, Rect, Segment};
pub use series::{Bar, BarSeries, BarSize};
pub use study::{DataContext, OpeningRangeStudy, Study, ValueKey, ValueStore};
pub use style::{Color, RangeStyle, Theme};
pub use types::{DayKey, Price, Timestamp};
pub use view::{DrawContext, Viewport};
