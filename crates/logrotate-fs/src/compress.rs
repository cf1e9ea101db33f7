//! Archive compression

use flate2::write::GzEncoder;
use flate2::Compression;
use logrotate_core::{constants, Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns a closed log file into a compressed archive
pub trait Compressor: Send + Sync {
    /// Compress `source` into a new file at `archive` and return its path.
    ///
    /// `source` is left in place; removing it is the caller's job. On error
    /// no partial archive may remain at `archive`.
    fn compress(&self, source: &Path, archive: &Path) -> Result<PathBuf>;
}

/// gzip compressor readable by standard gzip tooling
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: u32,
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new(constants::DEFAULT_COMPRESSION_LEVEL)
    }
}

impl GzipCompressor {
    /// Levels above 9 are clamped
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(constants::MAX_COMPRESSION_LEVEL),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    fn encode(&self, source: &Path, output: File) -> io::Result<()> {
        let mut input = BufReader::new(File::open(source)?);
        let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::new(self.level));
        io::copy(&mut input, &mut encoder)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Compressor for GzipCompressor {
    fn compress(&self, source: &Path, archive: &Path) -> Result<PathBuf> {
        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(archive)
            .map_err(|e| Error::compression(archive, e))?;

        if let Err(e) = self.encode(source, output) {
            let _ = fs::remove_file(archive);
            return Err(Error::compression(archive, e));
        }

        debug!(source = %source.display(), archive = %archive.display(), "compressed log file");
        Ok(archive.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_gzip_round_trip() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.log");
        let archive = dir.path().join("app.log.gz");
        let content = "line one\nline two\n".repeat(100);
        fs::write(&source, &content).unwrap();

        let out = GzipCompressor::default().compress(&source, &archive).unwrap();
        assert_eq!(out, archive);
        assert!(source.exists());

        let mut decoded = String::new();
        GzDecoder::new(File::open(&archive).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);
    }

    #[test]
    fn test_missing_source_leaves_no_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("app.log.gz");

        let err = GzipCompressor::default()
            .compress(&dir.path().join("missing.log"), &archive)
            .unwrap_err();
        assert!(matches!(err, Error::Compression { .. }));
        assert!(!archive.exists());
    }

    #[test]
    fn test_existing_archive_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("app.log");
        let archive = dir.path().join("app.log.gz");
        fs::write(&source, "new").unwrap();
        fs::write(&archive, "old archive").unwrap();

        assert!(GzipCompressor::default().compress(&source, &archive).is_err());
        assert_eq!(fs::read_to_string(&archive).unwrap(), "old archive");
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(GzipCompressor::new(42).level(), 9);
        assert_eq!(GzipCompressor::new(0).level(), 0);
    }
}
