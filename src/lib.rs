//! Sinklog - a small structured logging facility
//!
//! A level from `LOG_LEVEL`, a fixed text format, a console sink and
//! size-rotated file sinks, all behind a shared [`logging::Logger`].
//!
//! ```no_run
//! let logger = sinklog::Logger::from_env()?;
//! logger.info("Listening on port 8080");
//! # Ok::<(), sinklog::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Destination, LoggingConfig, SinkConfig, StandardSink};
pub use error::{ConfigError, SinkError};
pub use logging::{LogLevel, LogRecord, Logger};
