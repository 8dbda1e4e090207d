//! Archive history for rotated log files
//!
//! Rotated files live next to the active file as `<name>.<n>.zip`, where slot
//! `1` is the most recent rotation and slot `retention` the oldest one kept.
//! Each archive holds a single entry named after the active file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{LogError, Result};

use super::report;

/// Extension appended to every archive slot
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Owns the numbered archive slots of one log file
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    dir: PathBuf,
    file_name: String,
    retention: usize,
}

impl ArchiveManager {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            retention,
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the plaintext file currently appended to
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Path of archive slot `n`
    pub fn archive_path(&self, n: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}", self.file_name, n, ARCHIVE_EXTENSION))
    }

    fn temp_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}.tmp", self.file_name, ARCHIVE_EXTENSION))
    }

    /// Slot number encoded in an archive file name, if it belongs to this log
    fn slot_of(&self, name: &str) -> Option<usize> {
        name.strip_prefix(self.file_name.as_str())?
            .strip_prefix('.')?
            .strip_suffix(ARCHIVE_EXTENSION)?
            .strip_suffix('.')?
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
    }

    /// Existing archive slots, oldest last
    pub fn archives(&self) -> Vec<(usize, PathBuf)> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut slots: Vec<(usize, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let slot = self.slot_of(path.file_name()?.to_str()?)?;
                Some((slot, path))
            })
            .collect();
        slots.sort_by_key(|(slot, _)| *slot);
        slots
    }

    /// Remove archives numbered above the retention count
    ///
    /// These only exist when an earlier run used a larger retention. Returns
    /// the number of files removed; failures are reported and skipped.
    pub fn prune_stale(&self) -> usize {
        let mut removed = 0;
        for (slot, path) in self.archives() {
            if slot <= self.retention {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(source) => report(&LogError::Eviction { path, source }),
            }
        }
        removed
    }

    /// Drop the oldest retained slot so the shift has room
    fn evict_oldest(&self) -> Result<()> {
        let path = self.archive_path(self.retention);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LogError::Eviction { path, source }),
        }
    }

    /// Move slots `retention-1 ..= 1` up by one, highest first.
    ///
    /// Stops at the first slot that cannot move: continuing would rename the
    /// slot below on top of it.
    fn shift(&self) -> Result<()> {
        for n in (1..self.retention).rev() {
            let from = self.archive_path(n);
            if fs::symlink_metadata(&from).is_err() {
                continue;
            }
            let to = self.archive_path(n + 1);
            fs::rename(&from, &to).map_err(|e| LogError::io("rename", from, e))?;
        }
        Ok(())
    }

    /// Compress `source` into a single-entry zip at `dest`
    pub fn compress(&self, source: &Path, dest: &Path) -> Result<()> {
        let mut input = File::open(source).map_err(|e| LogError::io("open", source, e))?;
        let len = input
            .metadata()
            .map_err(|e| LogError::io("stat", source, e))?
            .len();
        let output = File::create(dest).map_err(|e| LogError::io("create", dest, e))?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(len >= u64::from(u32::MAX));

        let archive_err = |source: zip::result::ZipError| LogError::Archive {
            path: dest.to_path_buf(),
            source,
        };

        let mut zip = ZipWriter::new(output);
        zip.start_file(self.file_name.as_str(), options)
            .map_err(archive_err)?;
        io::copy(&mut input, &mut zip).map_err(|e| LogError::io("compress", dest, e))?;
        let output = zip.finish().map_err(archive_err)?;
        output
            .sync_all()
            .map_err(|e| LogError::io("sync", dest, e))?;
        Ok(())
    }

    /// Roll the active file into slot 1 and leave a fresh empty file behind.
    ///
    /// On error the active file is left in place (and `active` untouched when
    /// the failure happens before the archive is committed) so the caller can
    /// keep appending to it.
    pub fn rotate(&self, active: &mut Option<File>) -> Result<()> {
        if self.retention > 0 {
            let temp = self.temp_path();
            if let Err(e) = self.compress(&self.active_path(), &temp) {
                let _ = fs::remove_file(&temp);
                self.recover_unlinked(active);
                return Err(e);
            }

            self.prune_stale();
            if let Err(e) = self.evict_oldest() {
                report(&e);
            }

            let newest = self.archive_path(1);
            let committed = self.shift().and_then(|()| {
                if fs::symlink_metadata(&newest).is_ok() {
                    return Err(LogError::io(
                        "rename",
                        &newest,
                        io::Error::new(io::ErrorKind::AlreadyExists, "archive slot still occupied"),
                    ));
                }
                fs::rename(&temp, &newest).map_err(|e| LogError::io("rename", &newest, e))
            });
            if let Err(e) = committed {
                let _ = fs::remove_file(&temp);
                return Err(e);
            }
            set_archive_permissions(&newest);
        }

        self.reset_active(active)
    }

    /// Point the handle back at a visible file when the active path was
    /// unlinked behind our back
    fn recover_unlinked(&self, active: &mut Option<File>) {
        let path = self.active_path();
        match fs::symlink_metadata(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            _ => return,
        }
        match open_active(&path) {
            Ok(file) => {
                tracing::warn!(path = %path.display(), "Active log file vanished, reopened it");
                *active = Some(file);
            }
            Err(e) => report(&e),
        }
    }

    /// Close the handle, discard the plaintext file and open an empty one
    fn reset_active(&self, active: &mut Option<File>) -> Result<()> {
        drop(active.take());

        let path = self.active_path();
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                report(&LogError::io("remove", &path, e));
                // Contents are already archived, so truncating in place is safe
                OpenOptions::new()
                    .write(true)
                    .open(&path)
                    .and_then(|f| f.set_len(0))
                    .map_err(|e| LogError::io("truncate", &path, e))?;
            }
        }

        *active = Some(open_active(&path)?);
        Ok(())
    }
}

/// Open (or create) the active file for appending
pub fn open_active(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::io("open", path, e))
}

#[cfg(unix)]
fn set_archive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o660)) {
        report(&LogError::io("chmod", path, e));
    }
}

#[cfg(not(unix))]
fn set_archive_permissions(_path: &Path) {}
