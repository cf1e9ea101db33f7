//! Error types for logrotate-fs

use std::path::PathBuf;

/// logrotate-fs error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("Cannot resolve path {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot initialize log file {}: {source}", .path.display())]
    Initialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Compression into {} failed: {source}", .path.display())]
    Compression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {failed} expired archive(s)")]
    Prune { failed: usize },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for logrotate-fs
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn invalid_name<S: Into<String>>(name: S) -> Self {
        Error::InvalidName(name.into())
    }

    pub fn path_resolution<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::PathResolution {
            path: path.into(),
            source,
        }
    }

    pub fn initialization<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::Initialization {
            path: path.into(),
            source,
        }
    }

    pub fn compression<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::Compression {
            path: path.into(),
            source,
        }
    }
}
