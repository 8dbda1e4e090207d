//! Logger configuration
//!
//! Settings are read from the `[log]` table of a TOML file. Each numeric
//! setting may be written as an integer or as a string, and values that are
//! out of range fall back to defaults instead of failing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::logging::LogLevel;

/// Default name of the active log file
pub const DEFAULT_FILE_NAME: &str = "standard-rest.log";

/// Default rotation threshold (30 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 30 * 1024 * 1024;

/// Default number of archives kept
pub const DEFAULT_RETENTION: usize = 3;

/// Settings for one file logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Name of the active log file
    pub file_name: String,

    /// Directory holding the active file and its archives
    pub file_path: PathBuf,

    /// Minimum severity written
    pub level: LogLevel,

    /// Number of zip archives kept (0 keeps none)
    pub retention: usize,

    /// Size in bytes above which the active file is rotated before the next write
    pub max_size: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            file_path: PathBuf::from("."),
            level: LogLevel::Info,
            retention: DEFAULT_RETENTION,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// A setting that may be written as a number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Setting {
    Int(i64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawLogSection {
    file_name: Option<String>,
    file_path: Option<String>,
    level: Option<Setting>,
    retention: Option<Setting>,
    max_size: Option<Setting>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    log: RawLogSection,
}

#[derive(Serialize)]
struct ConfigFileOut<'a> {
    log: &'a LoggerConfig,
}

impl LoggerConfig {
    /// Build a config from the five raw init parameters.
    ///
    /// Out-of-range level becomes `Info`, negative retention or size become
    /// their defaults.
    pub fn from_raw(
        file_name: &str,
        file_path: impl Into<PathBuf>,
        level: i64,
        retention: i64,
        max_size: i64,
    ) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_path: file_path.into(),
            level: LogLevel::from_index(level),
            retention: clamp_retention(retention),
            max_size: clamp_max_size(max_size),
        }
    }

    /// Parse the `[log]` table of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfigFile = toml::from_str(content).context("Failed to parse config file")?;
        let section = raw.log;
        let defaults = Self::default();

        Ok(Self {
            file_name: section.file_name.unwrap_or(defaults.file_name),
            file_path: section
                .file_path
                .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
                .unwrap_or(defaults.file_path),
            level: section.level.map(level_setting).unwrap_or(defaults.level),
            retention: section
                .retention
                .map(|s| clamp_retention(int_setting("retention", s)))
                .unwrap_or(defaults.retention),
            max_size: section
                .max_size
                .map(|s| clamp_max_size(size_setting(s)))
                .unwrap_or(defaults.max_size),
        })
    }

    /// Load configuration from file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as a TOML document with a `[log]` table
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(&ConfigFileOut { log: self }).context("Failed to serialize config")
    }

    /// Reject settings no logger can run with
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.file_name.is_empty() {
            return Err(LogError::Config("file name is empty".to_string()));
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(LogError::Config(format!(
                "file name '{}' must not contain a path separator",
                self.file_name
            )));
        }
        Ok(())
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        self.file_path.join(&self.file_name)
    }
}

fn clamp_retention(retention: i64) -> usize {
    usize::try_from(retention).unwrap_or(DEFAULT_RETENTION)
}

fn clamp_max_size(max_size: i64) -> u64 {
    u64::try_from(max_size).unwrap_or(DEFAULT_MAX_SIZE)
}

fn level_setting(setting: Setting) -> LogLevel {
    match setting {
        Setting::Int(index) => LogLevel::from_index(index),
        Setting::Text(text) => text.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to INFO log level");
            LogLevel::Info
        }),
    }
}

/// Non-numeric text maps to -1 so it takes the default path
fn int_setting(name: &str, setting: Setting) -> i64 {
    match setting {
        Setting::Int(value) => value,
        Setting::Text(text) => text.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(setting = name, value = %text, "Ignoring non-numeric setting");
            -1
        }),
    }
}

/// Sizes accept an optional K, M or G suffix (powers of 1024)
fn size_setting(setting: Setting) -> i64 {
    let text = match setting {
        Setting::Int(value) => return value,
        Setting::Text(text) => text,
    };

    let upper = text.trim().to_ascii_uppercase();
    let digits = upper.trim_end_matches('B');
    let (number, multiplier) = match digits.chars().last() {
        Some('K') => (&digits[..digits.len() - 1], 1024),
        Some('M') => (&digits[..digits.len() - 1], 1024 * 1024),
        Some('G') => (&digits[..digits.len() - 1], 1024 * 1024 * 1024),
        _ => (digits, 1),
    };

    match number.trim().parse::<i64>() {
        Ok(value) => value.saturating_mul(multiplier),
        Err(_) => {
            tracing::warn!(setting = "max_size", value = %text, "Ignoring non-numeric setting");
            -1
        }
    }
}

/// Get the default config file location (`<config dir>/filelog/config.toml`)
/// Falls back to ./filelog.toml if the platform config directory is unknown
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("filelog").join("config.toml"))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine config directory, using current directory");
            PathBuf::from("filelog.toml")
        })
}
