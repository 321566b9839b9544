//! The logger: a global level gate in front of an ordered list of sinks
//!
//! A `Logger` is built once at startup and handed around as `Arc<Logger>`.
//! Calls never fail and never panic; sink failures are only visible through
//! [`Logger::stats`].

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use super::console::ConsoleSink;
use super::file_writer::RotatingFileSink;
use super::format::should_emit;
use super::record::{LogLevel, LogRecord};
use super::sink::{Sink, SinkStatsSnapshot};
use crate::config::{Destination, LoggingConfig, SinkConfig};
use crate::error::ConfigError;

/// Dispatches records to every sink whose level they pass
pub struct Logger {
    level: LogLevel,
    sinks: Vec<Box<dyn Sink>>,
}

impl Logger {
    /// Create a logger with no sinks
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            sinks: Vec::new(),
        }
    }

    /// Add a sink after the existing ones
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Add an already boxed sink after the existing ones
    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Build a logger from configuration, with the console on stdout
    pub fn from_config(config: &LoggingConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Build a logger from configuration, sending console output to `console`
    pub fn from_config_with_console(
        config: &LoggingConfig,
        console: Box<dyn Write + Send>,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some(console))
    }

    fn build(
        config: &LoggingConfig,
        mut console: Option<Box<dyn Write + Send>>,
    ) -> Result<Self, ConfigError> {
        let mut logger = Self::new(config.level);
        for sink in config.resolved_sinks()? {
            logger.add_sink(build_sink(&sink, config.colorize, &mut console));
        }
        Ok(logger)
    }

    /// Build a shared logger from configuration and announce it
    pub fn init(config: &LoggingConfig) -> Result<Arc<Self>, ConfigError> {
        let logger = Arc::new(Self::from_config(config)?);
        logger.announce(config);
        Ok(logger)
    }

    /// Build a shared logger from `LOG_LEVEL` and announce it
    pub fn from_env() -> Result<Arc<Self>, ConfigError> {
        Self::init(&LoggingConfig::from_env())
    }

    /// Log the startup lines for `config`
    pub fn announce(&self, config: &LoggingConfig) {
        self.info(format!("Logger initialized with level: {}", config.level));
        if let Some(rejected) = &config.rejected_level {
            self.warn(format!(
                "Ignoring invalid LOG_LEVEL '{}', using {}",
                rejected, config.level
            ));
        }
        if config.level == LogLevel::Debug {
            self.debug("Debug mode enabled - verbose logging active");
        }
    }

    /// Global minimum level
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Level a sink actually filters at: its own level, never below the global one
    pub fn effective_level(&self, sink: &dyn Sink) -> LogLevel {
        sink.min_level().unwrap_or(self.level).max(self.level)
    }

    /// Most permissive effective level over all sinks, `None` without sinks
    pub fn min_level(&self) -> Option<LogLevel> {
        self.sinks
            .iter()
            .map(|sink| self.effective_level(sink.as_ref()))
            .min()
    }

    /// Whether a record at `level` would reach at least one sink
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.min_level().is_some_and(|min| should_emit(level, min))
    }

    /// Dispatch a record to every sink that accepts it
    pub fn log(&self, record: &LogRecord) {
        if !should_emit(record.level(), self.level) {
            return;
        }
        for sink in &self.sinks {
            if !should_emit(record.level(), self.effective_level(sink.as_ref())) {
                continue;
            }
            match sink.write(record) {
                Ok(()) => sink.stats().record_written(),
                Err(_) => sink.stats().record_dropped(),
            }
        }
    }

    /// Emit a record at `level`, with an optional error rendered as its detail
    pub fn emit(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        error: Option<&(dyn Error + 'static)>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let record = LogRecord::new(level, message);
        let record = match error {
            Some(error) => record.with_error(error),
            None => record,
        };
        self.log(&record);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message, None);
    }

    /// Log at error level with `error` and its causes as the detail
    pub fn error_with(&self, message: impl Into<String>, error: &(dyn Error + 'static)) {
        self.emit(LogLevel::Error, message, Some(error));
    }

    /// Iterate over the sinks in dispatch order
    pub fn sinks(&self) -> impl Iterator<Item = &dyn Sink> {
        self.sinks.iter().map(|sink| sink.as_ref())
    }

    /// Delivery counters per sink, keyed by sink name
    pub fn stats(&self) -> Vec<(String, SinkStatsSnapshot)> {
        self.sinks
            .iter()
            .map(|sink| (sink.name().to_string(), sink.stats().snapshot()))
            .collect()
    }
}

fn build_sink(
    config: &SinkConfig,
    colorize: bool,
    console: &mut Option<Box<dyn Write + Send>>,
) -> Box<dyn Sink> {
    match config.destination {
        Destination::Console => match console.take() {
            Some(writer) => Box::new(ConsoleSink::with_writer(writer, false, config.min_level)),
            None => Box::new(ConsoleSink::stdout(colorize, config.min_level)),
        },
        Destination::File => Box::new(RotatingFileSink::new(
            config.path.clone().unwrap_or_default(),
            config.min_level,
            config.effective_max_size(),
            config.effective_max_files(),
        )),
    }
}
