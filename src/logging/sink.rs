//! The sink abstraction shared by console, file and memory destinations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::record::{LogLevel, LogRecord};
use crate::error::SinkError;

/// A destination for log records
///
/// `write` must never panic and never block beyond a brief lock. Failures are
/// returned so the logger can count them, but they never reach the caller of
/// `Logger::emit`.
pub trait Sink: Send + Sync {
    /// Short name used in diagnostics (e.g. `console`, `logs/error.log`)
    fn name(&self) -> &str;

    /// Minimum level this sink asks for; `None` inherits the logger's level
    fn min_level(&self) -> Option<LogLevel>;

    /// Write one record
    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivery counters for this sink
    fn stats(&self) -> &SinkStats;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn min_level(&self) -> Option<LogLevel> {
        (**self).min_level()
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn stats(&self) -> &SinkStats {
        (**self).stats()
    }
}

/// Counters kept by every sink
#[derive(Debug, Default)]
pub struct SinkStats {
    written: AtomicU64,
    dropped: AtomicU64,
    rotations: AtomicU64,
    failed_rotations: AtomicU64,
}

/// Point-in-time copy of [`SinkStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStatsSnapshot {
    pub written: u64,
    pub dropped: u64,
    pub rotations: u64,
    pub failed_rotations: u64,
}

impl SinkStats {
    pub fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_rotation(&self) {
        self.failed_rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SinkStatsSnapshot {
        SinkStatsSnapshot {
            written: self.written.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            failed_rotations: self.failed_rotations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_snapshot() {
        let stats = SinkStats::default();
        stats.record_written();
        stats.record_written();
        stats.record_dropped();
        stats.record_rotation();

        assert_eq!(
            stats.snapshot(),
            SinkStatsSnapshot {
                written: 2,
                dropped: 1,
                rotations: 1,
                failed_rotations: 0,
            }
        );
    }
}
