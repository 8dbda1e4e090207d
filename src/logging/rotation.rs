//! Size-based rotation trigger

use std::fs::File;

/// Whether a file of `active_size` bytes must be rotated before the next write
pub fn needs_rotate(active_size: u64, max_size: u64) -> bool {
    active_size > max_size
}

/// Checks the active file's size before every write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    max_size: u64,
}

impl RotationPolicy {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Stat the open handle and decide whether to rotate.
    ///
    /// A failed stat is reported and treated as "no rotation": writing to an
    /// oversized file beats dropping the record.
    pub fn check(&self, file: &File) -> bool {
        match file.metadata() {
            Ok(meta) => needs_rotate(meta.len(), self.max_size),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to stat active log file");
                false
            }
        }
    }
}
