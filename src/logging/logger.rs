//! The logger handle
//!
//! `FileLogger::init` validates the configuration, prepares the directory and
//! opens the active file. The returned handle is cheap to clone and can be
//! shared between threads; every clone writes through the same sink.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::error::{LogError, Result};

use super::archive::ArchiveManager;
use super::format::{CallSite, LogRecord};
use super::level::{should_emit, LogLevel};
use super::report;
use super::rotation::RotationPolicy;
use super::sink::{Sink, SinkStats};

#[derive(Debug)]
struct Inner {
    config: LoggerConfig,
    sink: Sink,
}

/// Handle to a leveled, size-rotated log file
#[derive(Debug, Clone)]
pub struct FileLogger {
    inner: Arc<Inner>,
}

impl FileLogger {
    /// Create a logger from a configuration.
    ///
    /// Fails on an invalid file name, or when the directory or the active file
    /// cannot be created. Nothing after this point returns an error to the
    /// caller.
    pub fn init(config: LoggerConfig) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.file_path)
            .map_err(|e| LogError::io("create directory", &config.file_path, e))?;

        let archive = ArchiveManager::new(
            config.file_path.clone(),
            config.file_name.clone(),
            config.retention,
        );
        let pruned = archive.prune_stale();
        if pruned > 0 {
            tracing::info!(count = pruned, "Removed archives beyond retention");
        }

        let sink = Sink::new(archive, RotationPolicy::new(config.max_size));
        sink.open()?;

        Ok(Self {
            inner: Arc::new(Inner { config, sink }),
        })
    }

    /// Create a logger from raw settings, clamping out-of-range values
    pub fn new(
        file_name: &str,
        file_path: impl AsRef<Path>,
        level: i64,
        retention: i64,
        max_size: i64,
    ) -> Result<Self> {
        Self::init(LoggerConfig::from_raw(
            file_name,
            file_path.as_ref(),
            level,
            retention,
            max_size,
        ))
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Minimum severity written
    pub fn level(&self) -> LogLevel {
        self.inner.config.level
    }

    /// Whether a record at `level` would be written
    pub fn enabled(&self, level: LogLevel) -> bool {
        should_emit(level, self.level())
    }

    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        self.inner.sink.path()
    }

    /// Path of archive slot `n` (1 is the newest)
    pub fn archive_path(&self, n: usize) -> PathBuf {
        self.inner.sink.archive().archive_path(n)
    }

    /// Existing archives, newest first
    pub fn archives(&self) -> Vec<(usize, PathBuf)> {
        self.inner.sink.archive().archives()
    }

    pub fn stats(&self) -> &SinkStats {
        self.inner.sink.stats()
    }

    /// Write `message` verbatim at `level`, attributed to `site`
    pub fn log_at(&self, level: LogLevel, site: CallSite, message: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }
        let line = LogRecord::now(level, site, message.as_ref()).render();
        if let Err(e) = self.inner.sink.write(line.as_bytes()) {
            report(&e);
        }
    }

    /// Format `args` and write the result at `level`, attributed to `site`
    pub fn log_args_at(&self, level: LogLevel, site: CallSite, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        match args.as_str() {
            Some(message) => self.log_at(level, site, message),
            None => self.log_at(level, site, args.to_string()),
        }
    }

    /// Write `message` verbatim at `level`
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_at(level, CallSite::caller(), message);
    }

    /// Write a formatted message at `level`
    #[track_caller]
    pub fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log_args_at(level, CallSite::caller(), args);
    }

    #[track_caller]
    pub fn trace(&self, message: impl AsRef<str>) {
        self.log_at(LogLevel::Trace, CallSite::caller(), message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log_at(LogLevel::Debug, CallSite::caller(), message);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log_at(LogLevel::Info, CallSite::caller(), message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log_at(LogLevel::Warn, CallSite::caller(), message);
    }

    #[track_caller]
    pub fn crit(&self, message: impl AsRef<str>) {
        self.log_at(LogLevel::Crit, CallSite::caller(), message);
    }

    /// Release the active file handle; a later write reopens it
    pub fn close(&self) {
        self.inner.sink.close();
    }
}
