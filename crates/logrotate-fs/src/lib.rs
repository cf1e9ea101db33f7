//! logrotate-fs - Size-triggered log rotation with gzip archives
//!
//! Entries are appended to `<directory>/<name>.log`. Once that file reaches
//! the configured size it is compressed to `<name>.<stamp>.log.gz`, the
//! oldest archives beyond the retention count are deleted and a fresh file
//! is started.

pub mod archive;
pub mod compress;
mod engine;
pub mod header;
#[cfg(test)]
pub mod mock;
pub mod path;
mod sink;
pub mod timestamp;

pub use archive::{list_archives, list_preserved, prune_expired, PruneReport};
pub use compress::{Compressor, GzipCompressor};
pub use engine::RotationEngine;
pub use sink::LogSink;

pub use logrotate_core::{Archive, Error, FlushPolicy, Result, RotationPolicy, RotationSettings};
