// File: crates/opening-range-core/src/style.rs
// Summary: Colours, line/fill/label styles and light/dark theme presets for range figures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OpeningRangeError;

/// RGBA colour; serialized as "#RRGGBB" or "#RRGGBBAA".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a } }
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }
}

impl FromStr for Color {
    type Err = OpeningRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || OpeningRangeError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() { return Err(bad()); }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self { r: byte(0)?, g: byte(2)?, b: byte(4)?, a })
    }
}

impl TryFrom<String> for Color {
    type Error = OpeningRangeError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Color> for String {
    fn from(c: Color) -> String { c.to_string() }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub enabled: bool,
    pub color: Color,
    pub width: f32,
    /// On/off dash lengths in pixels; solid when empty.
    pub dash: Vec<f32>,
}

impl LineStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self { enabled: true, color, width, dash: Vec::new() }
    }

    /// Stroke width, one pixel heavier while the figure is selected.
    pub fn stroke_width(&self, selected: bool) -> f32 {
        if selected { self.width + 1.0 } else { self.width }
    }
}

impl Default for LineStyle {
    fn default() -> Self { Self::solid(Theme::dark().line, 2.0) }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillStyle {
    pub enabled: bool,
    pub color: Color,
}

impl Default for FillStyle {
    fn default() -> Self { Self { enabled: true, color: Theme::dark().fill } }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub enabled: bool,
    pub color: Color,
    pub size: f32,
}

impl Default for LabelStyle {
    fn default() -> Self { Self { enabled: true, color: Theme::dark().text, size: 11.0 } }
}

/// Price-axis marker for a published value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorStyle {
    pub enabled: bool,
    pub color: Color,
}

impl Default for IndicatorStyle {
    fn default() -> Self { Self { enabled: true, color: Theme::dark().blue } }
}

/// Everything a range figure needs to paint itself.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeStyle {
    pub top_line: LineStyle,
    pub bottom_line: LineStyle,
    pub fill: FillStyle,
    pub labels: LabelStyle,
}

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub line: Color,
    pub fill: Color,
    pub text: Color,
    pub blue: Color,
    pub red: Color,
    pub candle_up: Color,
    pub candle_down: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::from_argb(255, 18, 18, 20),
            line: Color::from_argb(255, 255, 200, 64),
            fill: Color::from_argb(48, 255, 200, 64),
            text: Color::from_argb(255, 235, 235, 245),
            blue: Color::from_argb(255, 64, 160, 255),
            red: Color::from_argb(255, 220, 80, 80),
            candle_up: Color::from_argb(255, 40, 200, 120),
            candle_down: Color::from_argb(255, 220, 80, 80),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::from_argb(255, 250, 250, 252),
            line: Color::from_argb(255, 200, 120, 0),
            fill: Color::from_argb(40, 200, 120, 0),
            text: Color::from_argb(255, 20, 20, 30),
            blue: Color::from_argb(255, 32, 120, 200),
            red: Color::from_argb(255, 200, 60, 60),
            candle_up: Color::from_argb(255, 20, 160, 90),
            candle_down: Color::from_argb(255, 200, 60, 60),
        }
    }
}

impl Default for Theme {
    fn default() -> Self { Theme::dark() }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light()]
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    presets().into_iter().find(|t| t.name.eq_ignore_ascii_case(name)).unwrap_or_else(Theme::dark)
}
