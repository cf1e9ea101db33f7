//! Archive discovery and retention

use logrotate_core::{Archive, Error, Result, RotationPolicy};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::timestamp;

/// Outcome of a pruning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Archives deleted
    pub removed: usize,
    /// Archives that should have been deleted but could not be
    pub failed: usize,
}

impl PruneReport {
    /// `Err(Error::Prune)` if any deletion failed
    pub fn into_result(self) -> Result<usize> {
        if self.failed > 0 {
            Err(Error::Prune {
                failed: self.failed,
            })
        } else {
            Ok(self.removed)
        }
    }
}

/// List the archives of `logical_name` in `directory`, oldest first.
///
/// Only regular files whose name decodes as an archive of `logical_name`
/// are returned. A missing directory yields an empty list.
pub fn list_archives(directory: &Path, logical_name: &str) -> Result<Vec<Archive>> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(time) = timestamp::decode(name, logical_name) {
            archives.push(Archive::new(entry.path(), time));
        }
    }

    archives.sort();
    Ok(archives)
}

/// Uncompressed logs of `logical_name` kept aside after failed compressions,
/// oldest first. These are never pruned.
pub fn list_preserved(directory: &Path, logical_name: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    let mut preserved = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(time) = file_name
            .to_str()
            .and_then(|name| timestamp::decode_preserved(name, logical_name))
        {
            preserved.push((time, entry.path()));
        }
    }

    preserved.sort();
    Ok(preserved.into_iter().map(|(_, path)| path).collect())
}

/// Delete the oldest archives of `logical_name` beyond `max_archive_count`.
///
/// Nothing is removed unless the count is strictly above the limit. A
/// failed deletion is logged and the remaining candidates are still tried.
pub fn prune_expired(directory: &Path, logical_name: &str, max_archive_count: u32) -> PruneReport {
    let archives = match list_archives(directory, logical_name) {
        Ok(archives) => archives,
        Err(e) => {
            warn!(directory = %directory.display(), error = %e, "cannot list archives for pruning");
            return PruneReport::default();
        }
    };

    let policy = RotationPolicy {
        max_archive_count,
        ..RotationPolicy::default()
    };
    let excess = policy.excess_archives(archives.len());

    let mut report = PruneReport::default();
    for archive in archives.iter().take(excess) {
        match fs::remove_file(&archive.path) {
            Ok(()) => {
                debug!(archive = %archive.path.display(), "removed expired archive");
                report.removed += 1;
            }
            Err(e) => {
                warn!(archive = %archive.path.display(), error = %e, "failed to remove expired archive");
                report.failed += 1;
            }
        }
    }
    report
}
