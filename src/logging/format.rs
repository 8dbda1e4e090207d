//! Line formatting
//!
//! Every record is rendered as a single line:
//! `[YYYY/MM/DD HH:MM:SS.mmm ][LEVEL][file.rs,42]message\n`

use std::fmt::Write as _;
use std::panic::Location;

use chrono::{DateTime, Local};

use super::level::LogLevel;

/// Width of the rendered timestamp, without the trailing space
pub const TIME_HEADER_LEN: usize = 23;

/// Render the wall-clock timestamp as `YYYY/MM/DD HH:MM:SS.mmm`
pub fn format_time_header(when: &DateTime<Local>) -> String {
    when.format("%Y/%m/%d %H:%M:%S%.3f").to_string()
}

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Capture the location of whoever called the outermost `#[track_caller]`
    /// function in the current chain.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// File name without its directories
    pub fn basename(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

/// One record on its way to the sink. Only the rendered line outlives the call.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub when: DateTime<Local>,
    pub level: LogLevel,
    pub site: CallSite,
    pub message: &'a str,
}

impl<'a> LogRecord<'a> {
    /// Create a record stamped with the current local time
    pub fn now(level: LogLevel, site: CallSite, message: &'a str) -> Self {
        Self {
            when: Local::now(),
            level,
            site,
            message,
        }
    }

    /// Render the record as a newline-terminated line
    pub fn render(&self) -> String {
        format_line(&self.when, self.level, &self.site, self.message)
    }
}

/// Render a complete log line
pub fn format_line(
    when: &DateTime<Local>,
    level: LogLevel,
    site: &CallSite,
    message: &str,
) -> String {
    let mut line = String::with_capacity(TIME_HEADER_LEN + message.len() + 48);
    // Writing into a String cannot fail
    let _ = write!(
        line,
        "[{} ][{}][{},{}]{}",
        format_time_header(when),
        level.as_str(),
        site.basename(),
        site.line,
        message
    );
    line.push('\n');
    line
}
