//! Log file header and file opening helpers

use chrono::{DateTime, TimeZone};
use logrotate_core::constants::{HEADER_BANNER, HEADER_TIME_FORMAT};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// First line of every new log file, followed by a blank line
pub fn format_log_header<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("\t\t{}{}\n\n", HEADER_BANNER, now.format(HEADER_TIME_FORMAT))
}

/// Open `path` for appending, creating it if absent
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Create (or truncate) `path` and its parent directory
pub fn create_and_open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

/// Open `path` and write a fresh header to it.
///
/// With `truncate` the previous content is discarded, otherwise the header
/// is appended. Returns the buffered writer and the number of header bytes
/// written. A file created by this call is removed again if the header
/// cannot be written.
pub fn open_with_header(path: &Path, truncate: bool) -> io::Result<(BufWriter<File>, u64)> {
    let existed = path.exists();
    let result = open_and_write_header(path, truncate);
    if result.is_err() && !existed && path.is_file() {
        let _ = fs::remove_file(path);
    }
    result
}

fn open_and_write_header(path: &Path, truncate: bool) -> io::Result<(BufWriter<File>, u64)> {
    let file = if truncate {
        create_and_open_log_file(path)?
    } else {
        open_log_file(path)?
    };

    let header = format_log_header(chrono::Local::now());
    let mut writer = BufWriter::new(file);
    writer.write_all(header.as_bytes())?;
    writer.flush()?;

    debug!(path = %path.display(), "opened log file");
    Ok((writer, header.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_header_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            format_log_header(now),
            "\t\tlogrotate-fs: created log file at: Tue Mar 05 07:08:09 2024\n\n"
        );
    }

    #[test]
    fn test_header_length_is_stable() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2031, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_log_header(a).len(), format_log_header(b).len());
    }

    #[test]
    fn test_open_with_header_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "previous\n").unwrap();

        let (writer, written) = open_with_header(&path, false).unwrap();
        drop(writer);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous\n\t\tlogrotate-fs"));
        assert_eq!(content.len() as u64, "previous\n".len() as u64 + written);
    }

    #[test]
    fn test_open_with_header_truncates_and_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("app.log");

        let (writer, _) = open_with_header(&path, true).unwrap();
        drop(writer);
        fs::write(&path, "stale").unwrap();

        let (writer, written) = open_with_header(&path, true).unwrap();
        drop(writer);
        assert_eq!(fs::metadata(&path).unwrap().len(), written);
    }

    #[test]
    fn test_open_with_header_fails_on_directory() {
        let dir = TempDir::new().unwrap();
        assert!(open_with_header(dir.path(), false).is_err());
        assert!(dir.path().is_dir());
    }
}
