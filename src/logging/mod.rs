//! Logging facility
//!
//! Records pass a global level gate, then every sink whose own minimum they
//! meet. Sinks cover the console, size-rotated files, and an in-memory ring
//! buffer; a `tracing` layer can feed the same logger.

mod buffer;
mod console;
pub mod file_writer;
mod format;
mod layer;
mod logger;
mod record;
pub mod retention;
mod sink;

pub use buffer::MemorySink;
pub use console::ConsoleSink;
pub use file_writer::{FileSinkState, RotatingFileSink};
pub use format::{format, format_colored, should_emit, TIMESTAMP_FORMAT};
pub use layer::{init_tracing, LoggerLayer};
pub use logger::Logger;
pub use record::{render_error_chain, LogLevel, LogRecord};
pub use sink::{Sink, SinkStats, SinkStatsSnapshot};
