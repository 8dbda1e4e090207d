//! Leveled file logging with size-based rotation
//!
//! A record flows through the level gate, is rendered into a single line and
//! handed to the sink, which rotates the active file into numbered zip
//! archives once it grows past the configured size.

mod archive;
mod format;
mod level;
mod logger;
mod rotation;
mod sink;

pub use archive::{open_active, ArchiveManager, ARCHIVE_EXTENSION};
pub use format::{format_line, format_time_header, CallSite, LogRecord, TIME_HEADER_LEN};
pub use level::{should_emit, LogLevel, ParseLevelError};
pub use logger::FileLogger;
pub use rotation::{needs_rotate, RotationPolicy};
pub use sink::{Sink, SinkStats};

use crate::error::LogError;

/// Send a failure to the diagnostic channel. Logging never fails the caller.
pub(crate) fn report(err: &LogError) {
    match err {
        LogError::Eviction { .. } => tracing::warn!(error = %err, "Failed to evict old log archive"),
        _ => tracing::error!(error = %err, "File logger failure"),
    }
}
