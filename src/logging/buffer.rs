//! In-memory ring buffer sink
//!
//! Keeps the most recent records for inspection, e.g. by a diagnostics view
//! or by tests asserting on what was logged.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::record::{LogLevel, LogRecord};
use super::sink::{Sink, SinkStats};
use crate::error::SinkError;

/// Thread-safe ring buffer of log records
pub struct MemorySink {
    records: RwLock<VecDeque<LogRecord>>,
    max_records: usize,
    min_level: Option<LogLevel>,
    stats: SinkStats,
}

impl MemorySink {
    /// Create a buffer holding at most `max_records` records
    pub fn new(max_records: usize, min_level: Option<LogLevel>) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(max_records)),
            max_records,
            min_level,
            stats: SinkStats::default(),
        }
    }

    /// Get all buffered records, oldest first
    pub fn records(&self) -> Vec<LogRecord> {
        self.read().iter().cloned().collect()
    }

    /// Get buffered messages, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.read()
            .iter()
            .map(|rec| rec.message().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<LogRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn min_level(&self) -> Option<LogLevel> {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if self.max_records == 0 {
            return Ok(());
        }
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }

    fn stats(&self) -> &SinkStats {
        &self.stats
    }
}
