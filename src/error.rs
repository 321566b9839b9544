//! Error types
//!
//! Only configuration errors ever reach callers. Sink errors are produced
//! inside sinks, counted, and dropped.

use std::io;
use std::path::PathBuf;

/// Problems building a logging configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A level name outside `debug|info|warn|error`
    #[error("invalid log level '{0}', expected one of debug, info, warn, error")]
    InvalidLevel(String),

    /// A file sink was configured without a path
    #[error("file sink at index {index} has no path")]
    MissingPath { index: usize },

    /// A file sink was configured with a zero size limit
    #[error("file sink {path} has max_size_bytes of 0")]
    ZeroMaxSize { path: PathBuf },
}

/// Failures inside a sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing a record failed
    #[error("failed to write log record: {0}")]
    Write(#[from] io::Error),

    /// Archiving the active file failed
    #[error("failed to rotate {path}: {source}")]
    Rotation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
