//! Mock compressors for testing

use logrotate_core::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::compress::Compressor;

/// A compressor that always fails without touching the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCompressor;

impl Compressor for FailingCompressor {
    fn compress(&self, _source: &Path, archive: &Path) -> Result<PathBuf> {
        Err(Error::compression(
            archive,
            io::Error::new(io::ErrorKind::Other, "simulated compression failure"),
        ))
    }
}

/// A compressor that records every call and writes an empty archive
#[derive(Debug, Default, Clone)]
pub struct RecordingCompressor {
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl RecordingCompressor {
    /// Shared handle to the recorded `(source, archive)` pairs
    pub fn calls(&self) -> Arc<Mutex<Vec<(PathBuf, PathBuf)>>> {
        Arc::clone(&self.calls)
    }
}

impl Compressor for RecordingCompressor {
    fn compress(&self, source: &Path, archive: &Path) -> Result<PathBuf> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((source.to_path_buf(), archive.to_path_buf()));
        }
        std::fs::write(archive, b"").map_err(|e| Error::compression(archive, e))?;
        Ok(archive.to_path_buf())
    }
}

/// A compressor that archives successfully but leaves a directory where the
/// source log was, so the active path cannot be reopened as a file
#[derive(Debug, Default, Clone, Copy)]
pub struct ObstructingCompressor;

impl Compressor for ObstructingCompressor {
    fn compress(&self, source: &Path, archive: &Path) -> Result<PathBuf> {
        std::fs::write(archive, b"").map_err(|e| Error::compression(archive, e))?;
        std::fs::remove_file(source).map_err(|e| Error::compression(archive, e))?;
        std::fs::create_dir(source).map_err(|e| Error::compression(archive, e))?;
        Ok(archive.to_path_buf())
    }
}
