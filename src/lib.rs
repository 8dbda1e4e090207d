//! filelog - leveled, size-bounded, self-rotating file logging
//!
//! A [`FileLogger`] appends fixed-format lines to `<file_path>/<file_name>`.
//! Before each write it checks the file size, and once the limit is exceeded
//! the file is compressed into `<file_name>.1.zip`, older archives move up one
//! slot, and anything past the retention count is dropped.
//!
//! ```no_run
//! use filelog::{FileLogger, LogLevel};
//!
//! let log = FileLogger::new("app.log", "/tmp/logs", LogLevel::Info.index(), 2, 1024 * 1024)?;
//! filelog::info!(log, "listening on {}", 8080);
//! filelog::warn!(log, "100% literal, no formatting");
//! # Ok::<(), filelog::LogError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::LoggerConfig;
pub use error::{LogError, Result};
pub use logging::{CallSite, FileLogger, LogLevel};

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, $logger:expr, $fmt:literal, $($arg:tt)+) => {
        $logger.log_args_at(
            $level,
            $crate::CallSite::new(file!(), line!()),
            format_args!($fmt, $($arg)+),
        )
    };
    ($level:expr, $logger:expr, $msg:expr $(,)?) => {
        $logger.log_at($level, $crate::CallSite::new(file!(), line!()), $msg)
    };
}

/// Log at TRACE: `trace!(logger, "fmt {}", arg)`, or a verbatim message
#[macro_export]
macro_rules! trace {
    ($($args:tt)+) => { $crate::__log!($crate::LogLevel::Trace, $($args)+) };
}

/// Log at DEBUG: `debug!(logger, "fmt {}", arg)`, or a verbatim message
#[macro_export]
macro_rules! debug {
    ($($args:tt)+) => { $crate::__log!($crate::LogLevel::Debug, $($args)+) };
}

/// Log at INFO: `info!(logger, "fmt {}", arg)`, or a verbatim message
#[macro_export]
macro_rules! info {
    ($($args:tt)+) => { $crate::__log!($crate::LogLevel::Info, $($args)+) };
}

/// Log at WARN: `warn!(logger, "fmt {}", arg)`, or a verbatim message
#[macro_export]
macro_rules! warn {
    ($($args:tt)+) => { $crate::__log!($crate::LogLevel::Warn, $($args)+) };
}

/// Log at CRIT: `crit!(logger, "fmt {}", arg)`, or a verbatim message
#[macro_export]
macro_rules! crit {
    ($($args:tt)+) => { $crate::__log!($crate::LogLevel::Crit, $($args)+) };
}
