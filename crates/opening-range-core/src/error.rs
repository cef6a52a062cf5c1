// File: crates/opening-range-core/src/error.rs
// Summary: Library error type.

use std::path::PathBuf;

use crate::types::Timestamp;

#[derive(Debug, thiserror::Error)]
pub enum OpeningRangeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("bar size must be at least one minute")]
    InvalidBarSize,
    #[error("invalid bar at {start}: {reason}")]
    InvalidBar { start: Timestamp, reason: &'static str },
    #[error("bar at {start} is older than the last bar at {last}")]
    OutOfOrder { start: Timestamp, last: Timestamp },
    #[error("invalid colour {0:?}, expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),
}

pub type Result<T> = std::result::Result<T, OpeningRangeError>;
