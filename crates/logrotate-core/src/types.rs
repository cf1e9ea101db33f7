//! Core types for logrotate-fs

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::constants::*;

/// Size threshold and retention count driving rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the active file holds at least this many bytes
    pub max_log_size: u64,
    /// Archives kept per log name; 0 keeps none
    pub max_archive_count: u32,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            max_archive_count: DEFAULT_MAX_ARCHIVE_COUNT,
        }
    }
}

impl RotationPolicy {
    pub fn new(max_log_size: u64, max_archive_count: u32) -> Self {
        Self {
            max_log_size,
            max_archive_count,
        }
    }

    /// Whether a file of `current_size` bytes must be rotated before the next write
    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size >= self.max_log_size
    }

    /// Number of archives to evict when `archive_count` exist.
    /// Eviction starts strictly above the limit.
    pub fn excess_archives(&self, archive_count: usize) -> usize {
        archive_count.saturating_sub(self.max_archive_count as usize)
    }
}

/// Write-count based flush policy.
///
/// An interval of 0 never forces a flush: buffered bytes reach the file
/// when the buffer fills, on rotation, on an explicit flush and on drop.
/// An interval of N flushes after every N writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    interval: usize,
    counter: usize,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_POLICY)
    }
}

impl FlushPolicy {
    pub fn new(interval: usize) -> Self {
        Self {
            interval,
            counter: 0,
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Record one write. Returns true when a flush is due, in which case
    /// the counter is already reset.
    pub fn record_write(&mut self) -> bool {
        if self.interval == 0 {
            return false;
        }
        self.counter += 1;
        if self.counter >= self.interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// A compressed, rotated-out log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
}

impl Archive {
    pub fn new(path: PathBuf, timestamp: DateTime<Utc>) -> Self {
        Self { path, timestamp }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

impl Ord for Archive {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.path.file_name().cmp(&other.path.file_name()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Archive {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
