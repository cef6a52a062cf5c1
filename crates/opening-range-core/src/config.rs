// File: crates/opening-range-core/src/config.rs
// Summary: Typed study settings with TOML loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::{Instrument, Session};
use crate::error::{OpeningRangeError, Result};
use crate::series::BarSize;
use crate::style::{FillStyle, IndicatorStyle, LabelStyle, LineStyle, RangeStyle, Theme};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningRangeConfig {
    /// Length of the opening period, in minutes.
    pub opening_period: BarSize,
    pub show_all_days: bool,
    pub extend_lines_right: bool,
    pub top_line: LineStyle,
    pub bottom_line: LineStyle,
    pub fill: FillStyle,
    pub labels: LabelStyle,
    pub high_indicator: IndicatorStyle,
    pub low_indicator: IndicatorStyle,
    pub instrument: Option<InstrumentConfig>,
}

/// Instrument calendar settings as written in TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub tick_size: f64,
    pub time_zone: String,
    pub session_open: String,
    pub session_close: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            tick_size: 0.01,
            time_zone: "UTC".to_string(),
            session_open: "00:00".to_string(),
            session_close: "00:00".to_string(),
        }
    }
}

impl InstrumentConfig {
    pub fn to_instrument(&self) -> Result<Instrument> {
        if !(self.tick_size > 0.0 && self.tick_size.is_finite()) {
            return Err(OpeningRangeError::InvalidConfig(format!("tick_size must be positive, got {}", self.tick_size)));
        }
        Ok(Instrument::new(self.symbol.clone())
            .with_time_zone(&self.time_zone)?
            .with_session(Session::parse(&self.session_open, &self.session_close)?)
            .with_tick_size(self.tick_size))
    }
}

impl Default for OpeningRangeConfig {
    fn default() -> Self { Self::with_theme(&Theme::dark()) }
}

impl OpeningRangeConfig {
    /// 30 minute opening range, all days, lines extended, colours from `theme`.
    pub fn with_theme(theme: &Theme) -> Self {
        Self {
            opening_period: BarSize::minutes(30).unwrap_or(BarSize::DAY),
            show_all_days: true,
            extend_lines_right: true,
            top_line: LineStyle::solid(theme.line, 2.0),
            bottom_line: LineStyle::solid(theme.line, 2.0),
            fill: FillStyle { enabled: true, color: theme.fill },
            labels: LabelStyle { enabled: true, color: theme.text, size: 11.0 },
            high_indicator: IndicatorStyle { enabled: true, color: theme.blue },
            low_indicator: IndicatorStyle { enabled: true, color: theme.red },
            instrument: None,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse `s` on top of `theme`'s defaults: colours the file leaves out come from the theme.
    pub fn from_toml_str_with_theme(s: &str, theme: &Theme) -> Result<Self> {
        let mut base = match toml::Value::try_from(Self::with_theme(theme)) {
            Ok(toml::Value::Table(t)) => t,
            Ok(_) => return Err(OpeningRangeError::InvalidConfig("defaults are not a table".into())),
            Err(e) => return Err(OpeningRangeError::InvalidConfig(e.to_string())),
        };
        merge_tables(&mut base, toml::from_str(s)?);
        let cfg: Self = toml::Value::Table(base).try_into()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read_config(path.as_ref())?)
    }

    pub fn load_with_theme(path: impl AsRef<Path>, theme: &Theme) -> Result<Self> {
        Self::from_toml_str_with_theme(&read_config(path.as_ref())?, theme)
    }

    pub fn validate(&self) -> Result<()> {
        if self.opening_period.as_minutes() >= BarSize::DAY.as_minutes() {
            return Err(OpeningRangeError::InvalidConfig("opening period must be shorter than a day".into()));
        }
        for (name, line) in [("top_line", &self.top_line), ("bottom_line", &self.bottom_line)] {
            if !(line.width > 0.0 && line.width.is_finite()) {
                return Err(OpeningRangeError::InvalidConfig(format!("{name}.width must be positive")));
            }
            if line.dash.iter().any(|d| !(*d > 0.0)) {
                return Err(OpeningRangeError::InvalidConfig(format!("{name}.dash entries must be positive")));
            }
        }
        if !(self.labels.size > 0.0) {
            return Err(OpeningRangeError::InvalidConfig("labels.size must be positive".into()));
        }
        Ok(())
    }

    /// Instrument from the `[instrument]` table, or the UTC 24h default.
    pub fn instrument(&self) -> Result<Instrument> {
        match &self.instrument {
            Some(ic) => ic.to_instrument(),
            None => Ok(Instrument::default()),
        }
    }

    pub fn range_style(&self) -> RangeStyle {
        RangeStyle {
            top_line: self.top_line.clone(),
            bottom_line: self.bottom_line.clone(),
            fill: self.fill,
            labels: self.labels,
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| OpeningRangeError::Io { path: path.to_path_buf(), source })
}

/// Overlay `over` onto `base`, descending into nested tables.
fn merge_tables(base: &mut toml::Table, over: toml::Table) {
    for (key, value) in over {
        match value {
            toml::Value::Table(inner) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, inner),
                _ => {
                    base.insert(key, toml::Value::Table(inner));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}
