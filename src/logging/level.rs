//! Severity levels and the emit gate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of a log record, ordered `Trace < Debug < Info < Warn < Crit`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Crit,
}

impl LogLevel {
    /// All levels, lowest severity first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Crit,
    ];

    /// Get the tag written into the log line for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Crit => "CRIT",
        }
    }

    /// Map a numeric level (`0` = trace .. `4` = crit) to a level.
    ///
    /// Anything out of range falls back to `Info` so a bad setting never
    /// leaves the logger unusable.
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Crit,
            _ => LogLevel::Info,
        }
    }

    /// Numeric value of this level
    pub fn index(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Ok(LogLevel::from_index(index));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "crit" | "critical" => Ok(LogLevel::Crit),
            _ => Err(ParseLevelError(trimmed.to_string())),
        }
    }
}

/// Whether a record at `level` passes a logger configured with `threshold`
pub fn should_emit(level: LogLevel, threshold: LogLevel) -> bool {
    level >= threshold
}
