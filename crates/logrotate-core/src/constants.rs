//! Constants and default values for logrotate-fs

/// Extension of the active (uncompressed) log file
pub const LOG_EXTENSION: &str = "log";

/// Extension appended to compressed archives, after the log extension
pub const ARCHIVE_EXTENSION: &str = "gz";

/// Default max size of the active log file in bytes (500MB)
pub const DEFAULT_MAX_LOG_SIZE: u64 = 524_288_000;

/// Default number of archives kept per log name
pub const DEFAULT_MAX_ARCHIVE_COUNT: u32 = 10;

/// Default flush policy: flush after every entry
pub const DEFAULT_FLUSH_POLICY: usize = 1;

/// Default gzip compression level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest accepted gzip compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Banner opening the first line of every new log file
pub const HEADER_BANNER: &str = "logrotate-fs: created log file at: ";

/// strftime format of the header timestamp (display only, never parsed)
pub const HEADER_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Characters that may never appear in a log file name
pub const ILLEGAL_FILE_NAME_CHARS: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '\'', '<', '>', '|', '$', ';', '&', '!', '~', '^', '`', '\0',
];

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "logrotate.toml",
    "logrotate.yaml",
    "logrotate.yml",
    "logrotate.json",
];

/// File name of the active log for a logical name
pub fn log_file_name(logical_name: &str) -> String {
    format!("{}.{}", logical_name, LOG_EXTENSION)
}

/// Trailing suffix shared by every archive (`.log.gz`)
pub fn archive_suffix() -> String {
    format!(".{}.{}", LOG_EXTENSION, ARCHIVE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name("app"), "app.log");
    }

    #[test]
    fn test_archive_suffix() {
        assert_eq!(archive_suffix(), ".log.gz");
    }
}
