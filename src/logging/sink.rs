//! The single writer behind a logger
//!
//! Holds the active file handle and runs stat, rotate and append under one
//! lock acquisition, so no writer ever sees a half-rotated file and no two
//! writers interleave across a rotation boundary.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{LogError, Result};

use super::archive::{open_active, ArchiveManager};
use super::report;
use super::rotation::RotationPolicy;

/// Counters describing what the sink has done so far
#[derive(Debug, Default)]
pub struct SinkStats {
    rotations: AtomicU64,
    failed_rotations: AtomicU64,
    write_errors: AtomicU64,
}

impl SinkStats {
    /// Completed rotations
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Rotations that were attempted and abandoned
    pub fn failed_rotations(&self) -> u64 {
        self.failed_rotations.load(Ordering::Relaxed)
    }

    /// Records that could not be written
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }
}

/// Owner of the active log file
#[derive(Debug)]
pub struct Sink {
    file: Mutex<Option<File>>,
    archive: ArchiveManager,
    policy: RotationPolicy,
    stats: SinkStats,
}

impl Sink {
    pub fn new(archive: ArchiveManager, policy: RotationPolicy) -> Self {
        Self {
            file: Mutex::new(None),
            archive,
            policy,
            stats: SinkStats::default(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.archive.active_path()
    }

    pub fn archive(&self) -> &ArchiveManager {
        &self.archive
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }

    /// Open the active file now instead of on the first write
    pub fn open(&self) -> Result<()> {
        let mut slot = self.lock();
        ensure_open(&mut slot, &self.archive.active_path())?;
        Ok(())
    }

    /// Whether a file handle is currently held
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Append one line, rotating first if the active file is over its limit
    pub fn write(&self, line: &[u8]) -> Result<()> {
        let mut slot = self.lock();
        let result = self.write_locked(&mut slot, line);
        if result.is_err() {
            self.stats.write_errors.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    fn write_locked(&self, slot: &mut Option<File>, line: &[u8]) -> Result<()> {
        let path = self.archive.active_path();

        let file = ensure_open(slot, &path)?;
        if self.policy.check(file) {
            match self.archive.rotate(slot) {
                Ok(()) => {
                    self.stats.rotations.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(path = %path.display(), "Rotated log file");
                }
                Err(e) => {
                    self.stats.failed_rotations.fetch_add(1, Ordering::Relaxed);
                    report(&e);
                }
            }
        }

        // A rotation that failed while reopening leaves no handle behind
        let file = ensure_open(slot, &path)?;
        file.write_all(line)
            .map_err(|e| LogError::io("write", &path, e))
    }

    /// Release the file handle. The next write reopens it.
    pub fn close(&self) {
        drop(self.lock().take());
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        // A panic while holding the lock cannot leave the handle half-updated
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_open<'a>(slot: &'a mut Option<File>, path: &Path) -> Result<&'a mut File> {
    let file = match slot.take() {
        Some(file) => file,
        None => open_active(path)?,
    };
    Ok(slot.insert(file))
}
