//! Error types for the file logger

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, LogError>;

/// An error raised inside the logging subsystem.
///
/// Only [`LogError::Config`] and initial open failures ever reach application
/// code (from `FileLogger::init`). Everything raised after that is reported to
/// the diagnostic channel and swallowed.
#[derive(Debug, Error)]
pub enum LogError {
    /// Invalid logger configuration.
    #[error("invalid logger configuration: {0}")]
    Config(String),

    /// A filesystem operation on the active file or an archive failed.
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compressing the active file into an archive failed.
    #[error("compress {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Removing an archive beyond the retention count failed.
    #[error("evict {}: {source}", path.display())]
    Eviction {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_operation_and_path() {
        let err = LogError::io(
            "open",
            "/tmp/logs/app.log",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "open /tmp/logs/app.log: denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = LogError::Config("file name is empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid logger configuration: file name is empty"
        );
    }
}
