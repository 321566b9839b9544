//! Console sink

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crossterm::tty::IsTty;

use super::format::{format, format_colored};
use super::record::{LogLevel, LogRecord};
use super::sink::{Sink, SinkStats};
use crate::error::SinkError;

/// Writes records to stdout (or any writer), one line per record
pub struct ConsoleSink {
    target: Mutex<Box<dyn Write + Send>>,
    colorize: bool,
    min_level: Option<LogLevel>,
    stats: SinkStats,
}

impl ConsoleSink {
    /// Create a sink on stdout. Colour is only used when stdout is a terminal.
    pub fn stdout(colorize: bool, min_level: Option<LogLevel>) -> Self {
        let colorize = colorize && io::stdout().is_tty();
        Self::with_writer(Box::new(io::stdout()), colorize, min_level)
    }

    /// Create a sink over an arbitrary writer
    pub fn with_writer(
        target: Box<dyn Write + Send>,
        colorize: bool,
        min_level: Option<LogLevel>,
    ) -> Self {
        Self {
            target: Mutex::new(target),
            colorize,
            min_level,
            stats: SinkStats::default(),
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn min_level(&self) -> Option<LogLevel> {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = if self.colorize {
            format_colored(record)
        } else {
            format(record)
        };
        line.push('\n');

        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        target.write_all(line.as_bytes())?;
        target.flush()?;
        Ok(())
    }

    fn stats(&self) -> &SinkStats {
        &self.stats
    }
}
