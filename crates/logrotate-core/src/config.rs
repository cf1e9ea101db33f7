//! Configuration file parsing for logrotate-fs
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{FlushPolicy, RotationPolicy};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_max_log_size() -> u64 {
    DEFAULT_MAX_LOG_SIZE
}

fn default_max_archive_count() -> u32 {
    DEFAULT_MAX_ARCHIVE_COUNT
}

fn default_flush_policy() -> usize {
    DEFAULT_FLUSH_POLICY
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

/// Settings for one rotating log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Logical log name (without extension)
    pub name: String,
    /// Directory holding the active file and its archives
    pub directory: PathBuf,
    /// Rotate once the active file reaches this many bytes
    #[serde(default = "default_max_log_size")]
    pub max_log_size: u64,
    /// Number of archives to keep (0 keeps none)
    #[serde(default = "default_max_archive_count")]
    pub max_archive_count: u32,
    /// Flush after this many writes (0 lets the buffer decide)
    #[serde(default = "default_flush_policy")]
    pub flush_policy: usize,
    /// gzip level, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl RotationSettings {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            max_archive_count: DEFAULT_MAX_ARCHIVE_COUNT,
            flush_policy: DEFAULT_FLUSH_POLICY,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Load settings from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse settings with the specified format and validate them
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let settings: RotationSettings = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Find and load the first known config file in `dir`
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let settings = Self::load(&path)?;
                return Ok((settings, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("name must not be empty"));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(Error::config("directory must not be empty"));
        }
        if self.max_log_size == 0 {
            return Err(Error::config("max_log_size must be a positive number of bytes"));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::config(format!(
                "compression_level must be between 0 and {}, got {}",
                MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.max_log_size, self.max_archive_count)
    }

    pub fn flush(&self) -> FlushPolicy {
        FlushPolicy::new(self.flush_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YAML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let content = r#"
name = "app"
directory = "/var/log/app"
max_log_size = 1048576
max_archive_count = 3
flush_policy = 0
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let settings = RotationSettings::load(file.path()).unwrap();
        assert_eq!(settings.name, "app");
        assert_eq!(settings.directory, PathBuf::from("/var/log/app"));
        assert_eq!(settings.policy(), RotationPolicy::new(1_048_576, 3));
        assert_eq!(settings.flush().interval(), 0);
        assert_eq!(settings.compression_level, DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_config_parse_yaml() {
        let content = r#"
name: worker
directory: ./logs
max_archive_count: 0
compression_level: 9
"#;
        let settings = RotationSettings::parse(content, ConfigFormat::Yaml).unwrap();
        assert_eq!(settings.name, "worker");
        assert_eq!(settings.max_archive_count, 0);
        assert_eq!(settings.max_log_size, DEFAULT_MAX_LOG_SIZE);
        assert_eq!(settings.compression_level, 9);
    }

    #[test]
    fn test_config_parse_json() {
        let content = r#"{"name": "api", "directory": "/tmp/api", "flush_policy": 10}"#;
        let settings = RotationSettings::parse(content, ConfigFormat::Json).unwrap();
        assert_eq!(settings.name, "api");
        assert_eq!(settings.flush_policy, 10);
        assert_eq!(settings.max_archive_count, DEFAULT_MAX_ARCHIVE_COUNT);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let zero_size = r#"{"name": "api", "directory": "/tmp", "max_log_size": 0}"#;
        let err = RotationSettings::parse(zero_size, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let bad_level = r#"{"name": "api", "directory": "/tmp", "compression_level": 12}"#;
        assert!(RotationSettings::parse(bad_level, ConfigFormat::Json).is_err());

        let no_name = r#"{"name": "  ", "directory": "/tmp"}"#;
        assert!(RotationSettings::parse(no_name, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_config_not_found() {
        let err = RotationSettings::load(Path::new("/nonexistent/logrotate.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_find_and_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("logrotate.yaml"),
            "name: svc\ndirectory: /tmp/svc\n",
        )
        .unwrap();

        let (settings, path) = RotationSettings::find_and_load(dir.path()).unwrap();
        assert_eq!(settings.name, "svc");
        assert!(path.ends_with("logrotate.yaml"));

        let empty = TempDir::new().unwrap();
        assert!(RotationSettings::find_and_load(empty.path()).is_err());
    }
}
