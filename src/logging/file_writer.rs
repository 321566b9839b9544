//! Size-rotated file sink
//!
//! The file is opened lazily on the first record, so a sink that never
//! receives anything leaves no file behind. Before each write the sink checks
//! whether the record would push the active file past its size limit; if so
//! the file is archived (see [`super::retention`]) and a fresh one started.
//! All of this happens under one mutex per sink.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::format::format;
use super::record::{LogLevel, LogRecord};
use super::retention::{archive_active, prune_archives};
use super::sink::{Sink, SinkStats};
use crate::error::SinkError;

/// Default rotation size (5 MiB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of archives kept
pub const DEFAULT_MAX_FILES: usize = 5;

/// Lifecycle of the active file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSinkState {
    /// No file handle yet, or the last open failed
    Closed,
    /// Accepting writes
    Open,
    /// A write crossed the size limit; rotation is about to run
    RotationPending,
    /// Archives are being shifted
    Rotating,
}

struct ActiveFile {
    file: Option<File>,
    size: u64,
    state: FileSinkState,
    pruned: bool,
}

impl ActiveFile {
    fn ensure_open(&mut self, path: &Path) -> std::io::Result<&mut File> {
        if self.file.is_none() {
            let opened = open_append(path);
            match opened {
                Ok((file, size)) => {
                    self.file = Some(file);
                    self.size = size;
                    self.state = FileSinkState::Open;
                }
                Err(e) => {
                    self.state = FileSinkState::Closed;
                    return Err(e);
                }
            }
        }
        self.file
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "log file not open"))
    }

    /// Append `bytes`, keeping `size` in step with the file even on a failed write
    fn append(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let file = self.ensure_open(path)?;
        match file.write_all(bytes) {
            Ok(()) => {
                self.size += bytes.len() as u64;
                Ok(())
            }
            Err(e) => {
                // Part of the record may have landed before the failure.
                let synced = file.metadata().map(|m| m.len());
                match synced {
                    Ok(len) => self.size = len,
                    Err(_) => {
                        self.file = None;
                        self.state = FileSinkState::Closed;
                    }
                }
                Err(e)
            }
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<(File, u64)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

/// Appends records to a file, rotating it by size
pub struct RotatingFileSink {
    path: PathBuf,
    name: String,
    min_level: Option<LogLevel>,
    max_size_bytes: u64,
    max_files: usize,
    active: Mutex<ActiveFile>,
    stats: SinkStats,
}

impl RotatingFileSink {
    /// Create a sink; nothing touches the filesystem until the first write
    pub fn new(
        path: impl Into<PathBuf>,
        min_level: Option<LogLevel>,
        max_size_bytes: u64,
        max_files: usize,
    ) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            min_level,
            max_size_bytes,
            max_files,
            active: Mutex::new(ActiveFile {
                file: None,
                size: 0,
                state: FileSinkState::Closed,
                pruned: false,
            }),
            stats: SinkStats::default(),
        }
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Current lifecycle state
    pub fn state(&self) -> FileSinkState {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Archive the active file. A failure leaves the current file in place.
    fn rotate(&self, active: &mut ActiveFile) -> Result<(), SinkError> {
        active.state = FileSinkState::Rotating;
        active.file = None;
        let result = archive_active(&self.path, self.max_files).map_err(|source| {
            SinkError::Rotation {
                path: self.path.clone(),
                source,
            }
        });
        active.size = 0;
        active.state = FileSinkState::Closed;
        result
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Option<LogLevel> {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = format(record);
        line.push('\n');
        let len = line.len() as u64;

        // A writer that panicked only leaves a handle and a size behind.
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.ensure_open(&self.path)?;

        // Archives left over from a run with a larger max_files
        if !active.pruned {
            active.pruned = true;
            let _ = prune_archives(&self.path, self.max_files);
        }

        if active.size > 0 && active.size + len > self.max_size_bytes {
            active.state = FileSinkState::RotationPending;
            match self.rotate(&mut active) {
                Ok(()) => self.stats.record_rotation(),
                Err(_) => self.stats.record_failed_rotation(),
            }
            active.ensure_open(&self.path)?;
        }

        active.append(&self.path, line.as_bytes())?;
        Ok(())
    }

    fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::retention::{archive_path, list_archives};
    use chrono::{Local, TimeZone};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    /// A record whose formatted line, newline included, is exactly 100 bytes
    fn hundred_byte_record(tag: char) -> LogRecord {
        let ts = Local.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).unwrap();
        // 19 (timestamp) + 9 (" [info]: ") + 71 + 1 (newline)
        let message: String = std::iter::repeat(tag).take(71).collect();
        LogRecord::new(LogLevel::Info, message).at(ts)
    }

    #[test]
    fn test_lazy_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("error.log");
        let sink = RotatingFileSink::new(&path, None, 1024, 2);

        assert_eq!(sink.state(), FileSinkState::Closed);
        assert!(!path.exists());

        sink.write(&LogRecord::new(LogLevel::Error, "first")).unwrap();

        assert_eq!(sink.state(), FileSinkState::Open);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with(" [error]: first\n"));
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        fs::write(&path, "previous run\n").unwrap();

        let sink = RotatingFileSink::new(&path, None, 1024, 2);
        sink.write(&LogRecord::new(LogLevel::Info, "next")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous run\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_exactly_one_rotation_when_crossing_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        let sink = RotatingFileSink::new(&path, None, 1000, 5);

        for _ in 0..10 {
            sink.write(&hundred_byte_record('a')).unwrap();
        }
        assert_eq!(sink.stats().snapshot().rotations, 0);
        assert_eq!(fs::metadata(&path).unwrap().len(), 1000);

        sink.write(&hundred_byte_record('b')).unwrap();

        assert_eq!(sink.stats().snapshot().rotations, 1);
        assert_eq!(sink.state(), FileSinkState::Open);
        assert_eq!(fs::metadata(&path).unwrap().len(), 100);
        assert_eq!(fs::metadata(archive_path(&path, 1)).unwrap().len(), 1000);
    }

    #[test]
    fn test_retains_at_most_max_files_archives() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("debug.log");
        let sink = RotatingFileSink::new(&path, None, 100, 3);

        // Every record fills the file, so each write after the first rotates.
        let tags = ['a', 'b', 'c', 'd', 'e', 'f'];
        for tag in tags {
            sink.write(&hundred_byte_record(tag)).unwrap();
        }

        assert_eq!(sink.stats().snapshot().rotations, 5);
        let archives = list_archives(&path).unwrap();
        assert_eq!(archives.len(), 3);
        assert!(fs::read_to_string(&path).unwrap().contains("fff"));
        assert!(fs::read_to_string(&archives[0]).unwrap().contains("eee"));
        assert!(fs::read_to_string(&archives[2]).unwrap().contains("ccc"));
    }

    #[test]
    fn test_first_open_prunes_excess_archives() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("error.log");
        for index in 1..=4 {
            fs::write(archive_path(&path, index), "old\n").unwrap();
        }

        let sink = RotatingFileSink::new(&path, None, 1024, 2);
        sink.write(&LogRecord::new(LogLevel::Error, "fresh")).unwrap();

        assert_eq!(list_archives(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_rotation_keeps_writing_to_active_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        // A non-empty directory where the first archive should go
        let blocker = archive_path(&path, 1);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let sink = RotatingFileSink::new(&path, None, 150, 1);
        for tag in ['a', 'b', 'c'] {
            sink.write(&hundred_byte_record(tag)).unwrap();
        }

        let stats = sink.stats().snapshot();
        assert_eq!(stats.rotations, 0);
        assert!(stats.failed_rotations > 0);
        assert_eq!(sink.state(), FileSinkState::Open);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        for tag in ["aaa", "bbb", "ccc"] {
            assert!(content.contains(tag));
        }
    }

    #[test]
    fn test_failed_append_resyncs_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("error.log");
        fs::write(&path, "0123456789").unwrap();

        // Read-only handle: every write fails
        let mut active = ActiveFile {
            file: Some(File::open(&path).unwrap()),
            size: 0,
            state: FileSinkState::Open,
            pruned: true,
        };

        assert!(active.append(&path, b"lost record\n").is_err());
        assert_eq!(active.size, 10);
    }

    #[test]
    fn test_poisoned_lock_keeps_sink_usable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        let sink = Arc::new(RotatingFileSink::new(&path, None, 1024, 1));

        let poisoner = Arc::clone(&sink);
        let crashed = thread::spawn(move || {
            let _guard = poisoner.active.lock().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();
        assert!(crashed.is_err());
        assert!(sink.active.is_poisoned());

        sink.write(&LogRecord::new(LogLevel::Info, "after crash")).unwrap();

        assert_eq!(sink.state(), FileSinkState::Open);
        assert!(fs::read_to_string(&path).unwrap().contains("after crash"));
    }

    #[test]
    fn test_oversized_record_still_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        let sink = RotatingFileSink::new(&path, None, 10, 1);

        sink.write(&hundred_byte_record('x')).unwrap();

        assert_eq!(sink.stats().snapshot().rotations, 0);
        assert_eq!(fs::metadata(&path).unwrap().len(), 100);
    }

    #[test]
    fn test_open_failure_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let sink = RotatingFileSink::new(temp_dir.path(), None, 1024, 1);

        let result = sink.write(&LogRecord::new(LogLevel::Error, "lost"));

        assert!(matches!(result, Err(SinkError::Write(_))));
        assert_eq!(sink.state(), FileSinkState::Closed);
    }

    #[test]
    fn test_concurrent_writes_never_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("combined.log");
        let sink = Arc::new(RotatingFileSink::new(&path, None, 4096, 1000));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..200 {
                        let record = LogRecord::new(LogLevel::Info, format!("thread {} line {}", t, i));
                        sink.write(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut files = list_archives(&path).unwrap();
        files.push(path.clone());
        let mut total = 0;
        for file in &files {
            let content = fs::read_to_string(file).unwrap();
            assert!(fs::metadata(file).unwrap().len() <= 4096);
            for line in content.lines() {
                assert!(line.contains(" [info]: thread "), "corrupt line: {line}");
                total += 1;
            }
        }
        assert_eq!(total, 1600);
        assert_eq!(sink.stats().snapshot().rotations as usize, files.len() - 1);
    }
}
