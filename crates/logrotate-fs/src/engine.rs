//! Size-triggered rotating log writer

use chrono::{DateTime, Duration, Utc};
use logrotate_core::{Error, FlushPolicy, Result, RotationPolicy, RotationSettings};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive;
use crate::compress::{Compressor, GzipCompressor};
use crate::header;
use crate::path;
use crate::timestamp;

/// Writes log entries to `<directory>/<name>.log` and archives the file
/// once it reaches the configured size.
///
/// The engine expects a single caller; serializing producers is the
/// dispatcher's job.
pub struct RotationEngine {
    logical_name: String,
    directory: PathBuf,
    path: PathBuf,
    /// `None` only after a failed reopen; the next write retries.
    file: Option<BufWriter<File>>,
    /// Bytes written since the file was opened, header included
    size: u64,
    /// File length before this engine opened it; a failed write truncates
    /// back to `base_len + size`
    base_len: u64,
    policy: RotationPolicy,
    flush: FlushPolicy,
    compressor: Box<dyn Compressor>,
}

impl RotationEngine {
    /// Create an engine writing `<directory>/<logical_name>.log` with gzip archives
    pub fn new(logical_name: &str, directory: impl AsRef<Path>) -> Result<Self> {
        Self::with_compressor(logical_name, directory, Box::new(GzipCompressor::default()))
    }

    /// Create an engine that archives through `compressor`
    pub fn with_compressor(
        logical_name: &str,
        directory: impl AsRef<Path>,
        compressor: Box<dyn Compressor>,
    ) -> Result<Self> {
        let sanitized = path::sanitize_file_name(logical_name);
        if sanitized.is_empty() {
            return Err(Error::invalid_name(logical_name));
        }

        let directory = directory.as_ref();
        let created = missing_ancestors(directory);
        let (log_path, writer, size) = match open_active(directory, &sanitized) {
            Ok(opened) => opened,
            Err(e) => {
                remove_created_dirs(&created);
                return Err(e);
            }
        };

        debug!(path = %log_path.display(), "log rotation engine started");
        let mut engine = Self {
            logical_name: sanitized,
            directory: parent_of(&log_path),
            path: log_path,
            file: None,
            size: 0,
            base_len: 0,
            policy: RotationPolicy::default(),
            flush: FlushPolicy::default(),
            compressor,
        };
        engine.install(writer, size);
        Ok(engine)
    }

    /// Create an engine from loaded settings
    pub fn from_settings(settings: &RotationSettings) -> Result<Self> {
        settings.validate()?;
        let compressor = GzipCompressor::new(settings.compression_level);
        let mut engine = Self::with_compressor(&settings.name, &settings.directory, Box::new(compressor))?;
        engine.policy = settings.policy();
        engine.flush = settings.flush();
        Ok(engine)
    }

    /// Append `entry`, rotating first if the file already reached the size limit.
    ///
    /// A failed rotation is logged and the entry is still written.
    pub fn write(&mut self, entry: &str) -> Result<()> {
        if self.policy.should_rotate(self.size) {
            self.rotate();
        }
        self.write_without_rotate(entry)
    }

    /// Append `entry` without checking the size limit.
    ///
    /// On error nothing is counted as written and the file is cut back to
    /// the last counted size, so retrying the same entry is safe.
    pub fn write_without_rotate(&mut self, entry: &str) -> Result<()> {
        let bytes = entry.as_bytes();
        let flush_before = self.flush;
        if let Err(e) = self.append(bytes) {
            self.flush = flush_before;
            self.rollback_failed_write();
            return Err(e);
        }
        self.size += bytes.len() as u64;
        Ok(())
    }

    /// Archive the active file, prune old archives and start a fresh file.
    ///
    /// Returns false if anything went wrong; writing can continue either way.
    pub fn rotate(&mut self) -> bool {
        match self.try_rotate() {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "log rotation failed");
                false
            }
        }
    }

    /// Like [`rotate`](Self::rotate) but returns the underlying error.
    ///
    /// If compression fails the uncompressed file is kept next to the
    /// archives as `<name>.<stamp>.log` and a fresh active file is opened.
    /// If it cannot even be moved aside, writing resumes on the old file.
    pub fn try_rotate(&mut self) -> Result<()> {
        if let Some(writer) = self.file.as_mut() {
            writer.flush().map_err(Error::Write)?;
        }

        let stamp = self.next_archive_time(Utc::now());
        let archive_path = self
            .directory
            .join(timestamp::archive_file_name(&self.logical_name, stamp));

        debug!(path = %self.path.display(), archive = %archive_path.display(), "rotating log file");
        // Close before compressing
        self.file = None;

        if let Err(e) = self.compressor.compress(&self.path, &archive_path) {
            self.recover_from_failed_archive(stamp);
            return Err(e);
        }
        info!(archive = %archive_path.display(), "archived log file");

        // A leftover is truncated by the fresh open below
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove rotated log file");
        }

        let report = archive::prune_expired(&self.directory, &self.logical_name, self.policy.max_archive_count);
        if let Err(e) = report.into_result() {
            warn!(directory = %self.directory.display(), removed = report.removed, error = %e, "pruning incomplete");
        }

        // On failure no handle is left; the next write re-creates the file
        self.open_fresh()
    }

    /// Switch to `<directory>/<file_name>` (`.log` appended if missing).
    ///
    /// An empty `directory` keeps the current one. On error the current
    /// file stays active and untouched.
    pub fn change_log_file(&mut self, directory: impl AsRef<Path>, file_name: &str) -> Result<()> {
        let directory = directory.as_ref();
        let directory = if directory.as_os_str().is_empty() {
            self.directory.as_path()
        } else {
            directory
        };

        if !path::is_valid_file_name(file_name) {
            return Err(Error::invalid_name(file_name));
        }
        let new_path = path::build_path(directory, &path::append_log_extension(file_name))?;
        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::path_resolution(parent, e))?;
        }
        let (writer, size) = header::open_with_header(&new_path, false).map_err(Error::Write)?;

        if let Some(mut old) = self.file.take() {
            if let Err(e) = old.flush() {
                warn!(path = %self.path.display(), error = %e, "failed to flush previous log file");
            }
        }

        info!(from = %self.path.display(), to = %new_path.display(), "changed log file");
        self.logical_name = path::strip_log_extension(file_name).to_string();
        self.directory = parent_of(&new_path);
        self.path = new_path;
        self.install(writer, size);
        Ok(())
    }

    /// Force buffered bytes to the file and reset the flush counter
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.file.as_mut() {
            writer.flush().map_err(Error::Write)?;
        }
        self.flush.reset();
        Ok(())
    }

    /// Flush pending bytes, then flush every `interval` writes (0 = never force)
    pub fn set_flush_policy(&mut self, interval: usize) {
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), error = %e, "flush before policy change failed");
        }
        self.flush = FlushPolicy::new(interval);
    }

    pub fn flush_policy(&self) -> usize {
        self.flush.interval()
    }

    /// Takes effect on the next write; no immediate rotation
    pub fn set_max_log_size(&mut self, bytes: u64) {
        self.policy.max_log_size = bytes;
    }

    pub fn max_log_size(&self) -> u64 {
        self.policy.max_log_size
    }

    /// Takes effect on the next rotation
    pub fn set_max_archive_count(&mut self, count: u32) {
        self.policy.max_archive_count = count;
    }

    pub fn max_archive_count(&self) -> u32 {
        self.policy.max_archive_count
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Path of the active, uncompressed log file
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Bytes written to the active file since it was opened
    pub fn current_size(&self) -> u64 {
        self.size
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Active writer, reopening the current path if a rotation left none
    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        if self.file.is_none() {
            let (writer, size) = header::open_with_header(&self.path, false).map_err(Error::Write)?;
            self.install(writer, size);
        }
        self.file
            .as_mut()
            .ok_or_else(|| Error::Write(io::Error::new(io::ErrorKind::NotConnected, "no active log file")))
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer()?.write_all(bytes).map_err(Error::Write)?;
        if self.flush.record_write() {
            self.writer()?.flush().map_err(Error::Write)?;
        }
        Ok(())
    }

    /// Drop unflushed bytes and cut the file back to what was counted
    fn rollback_failed_write(&mut self) {
        let Some(writer) = self.file.take() else {
            return;
        };
        // Discards the buffer without flushing it
        let (file, _unflushed) = writer.into_parts();
        drop(file);

        let counted = self.base_len + self.size;
        let truncated = fs::OpenOptions::new().write(true).open(&self.path).and_then(|f| {
            let on_disk = f.metadata()?.len();
            if on_disk > counted {
                f.set_len(counted)?;
            }
            Ok(on_disk)
        });
        match truncated {
            // Earlier entries still buffered when the write failed are gone
            Ok(on_disk) if on_disk < counted => {
                warn!(path = %self.path.display(), lost = counted - on_disk, "buffered entries lost after failed write");
                self.size = on_disk.saturating_sub(self.base_len);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot truncate log file after failed write");
            }
        }

        match header::open_log_file(&self.path) {
            Ok(file) => self.file = Some(BufWriter::new(file)),
            Err(e) => warn!(path = %self.path.display(), error = %e, "cannot reopen log file"),
        }
    }

    /// Make `writer` the active file; `size` is what was written to it so far
    fn install(&mut self, writer: BufWriter<File>, size: u64) {
        let on_disk = writer.get_ref().metadata().map(|m| m.len()).unwrap_or(size);
        self.base_len = on_disk.saturating_sub(size);
        self.file = Some(writer);
        self.size = size;
        self.flush.reset();
    }

    fn open_fresh(&mut self) -> Result<()> {
        let (writer, size) = header::open_with_header(&self.path, true).map_err(Error::Write)?;
        self.install(writer, size);
        Ok(())
    }

    /// Keep the unarchived content and get a writable active file back
    fn recover_from_failed_archive(&mut self, stamp: DateTime<Utc>) {
        let preserved = self
            .directory
            .join(timestamp::preserved_file_name(&self.logical_name, stamp));

        match fs::rename(&self.path, &preserved) {
            Ok(()) => {
                let kept = archive::list_preserved(&self.directory, &self.logical_name)
                    .map(|files| files.len())
                    .unwrap_or(1);
                warn!(
                    preserved = %preserved.display(),
                    kept,
                    "compression failed, kept uncompressed log"
                );
                if let Err(e) = self.open_fresh() {
                    warn!(path = %self.path.display(), error = %e, "cannot open fresh log file");
                }
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "compression failed, resuming current log");
                // Size is kept: the file still holds everything counted so far
                match header::open_log_file(&self.path) {
                    Ok(file) => self.file = Some(BufWriter::new(file)),
                    Err(e) => warn!(path = %self.path.display(), error = %e, "cannot reopen log file"),
                }
            }
        }
    }

    /// First microsecond at or after `now` whose archive name is still free
    fn next_archive_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut stamp = timestamp::truncate_to_resolution(now);
        loop {
            let archive = self
                .directory
                .join(timestamp::archive_file_name(&self.logical_name, stamp));
            let preserved = self
                .directory
                .join(timestamp::preserved_file_name(&self.logical_name, stamp));
            if !archive.exists() && !preserved.exists() {
                return stamp;
            }
            stamp += Duration::microseconds(1);
        }
    }
}

impl Drop for RotationEngine {
    fn drop(&mut self) {
        if let Some(mut writer) = self.file.take() {
            if let Err(e) = writer.flush() {
                warn!(path = %self.path.display(), error = %e, "failed to flush log file on close");
            }
        }
        info!(path = %self.path.display(), "log file closed");
    }
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Create `directory`, resolve the active file and open it with a header
fn open_active(directory: &Path, logical_name: &str) -> Result<(PathBuf, BufWriter<File>, u64)> {
    fs::create_dir_all(directory).map_err(|e| Error::initialization(directory, e))?;
    let log_path = path::build_path(directory, &path::append_log_extension(logical_name))?;
    let (writer, size) =
        header::open_with_header(&log_path, false).map_err(|e| Error::initialization(&log_path, e))?;
    Ok((log_path, writer, size))
}

/// Directories `create_dir_all(directory)` would create, deepest first
fn missing_ancestors(directory: &Path) -> Vec<PathBuf> {
    directory
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect()
}

fn remove_created_dirs(created: &[PathBuf]) {
    for dir in created {
        if let Err(e) = fs::remove_dir(dir) {
            debug!(directory = %dir.display(), error = %e, "cannot remove directory after failed start");
        }
    }
}
