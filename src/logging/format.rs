//! Record formatting and level filtering
//!
//! Output looks like `2026-01-21 14:30:45 [info]: message`, with the error
//! detail (if any) on the following lines.

use crossterm::style::Stylize;

use super::record::{LogLevel, LogRecord};

/// Timestamp pattern, locale independent
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Check whether a record at `record_level` passes a sink with minimum `sink_min_level`
pub fn should_emit(record_level: LogLevel, sink_min_level: LogLevel) -> bool {
    record_level >= sink_min_level
}

/// Render a record as plain text, without a trailing newline
pub fn format(record: &LogRecord) -> String {
    render(record, record.level().as_str())
}

/// Render a record with the level token wrapped in ANSI colour codes
pub fn format_colored(record: &LogRecord) -> String {
    let name = record.level().as_str();
    let level = match record.level() {
        LogLevel::Debug => name.blue(),
        LogLevel::Info => name.green(),
        LogLevel::Warn => name.yellow(),
        LogLevel::Error => name.red(),
    };
    render(record, &level.to_string())
}

fn render(record: &LogRecord, level: &str) -> String {
    let timestamp = record.timestamp().format(TIMESTAMP_FORMAT);
    match record.error_detail() {
        Some(detail) => format!("{} [{}]: {}\n{}", timestamp, level, record.message(), detail),
        None => format!("{} [{}]: {}", timestamp, level, record.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn fixed_record(level: LogLevel, message: &str) -> LogRecord {
        let ts = Local.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).unwrap();
        LogRecord::new(level, message).at(ts)
    }

    #[test]
    fn test_should_emit_ordering() {
        for (i, low) in LogLevel::ALL.iter().enumerate() {
            for high in &LogLevel::ALL[i + 1..] {
                assert!(!should_emit(*low, *high), "{low} passed min {high}");
                assert!(should_emit(*high, *low));
            }
            assert!(should_emit(*low, *low));
        }
    }

    #[test]
    fn test_format_plain() {
        let record = fixed_record(LogLevel::Info, "Logger initialized with level: info");
        assert_eq!(
            format(&record),
            "2026-01-21 14:30:45 [info]: Logger initialized with level: info"
        );
    }

    #[test]
    fn test_format_with_error_detail_adds_one_section() {
        let record = fixed_record(LogLevel::Error, "request failed").with_detail("timeout");
        let plain = format(&fixed_record(LogLevel::Error, "request failed"));
        let detailed = format(&record);
        assert_eq!(detailed, format!("{}\ntimeout", plain));
        assert_eq!(detailed.lines().count(), plain.lines().count() + 1);
    }

    #[test]
    fn test_format_multiline_detail_kept_verbatim() {
        let record = fixed_record(LogLevel::Error, "x").with_detail("a\nCaused by: b");
        assert!(format(&record).ends_with("]: x\na\nCaused by: b"));
    }

    #[test]
    fn test_format_colored_wraps_level_only() {
        let record = fixed_record(LogLevel::Warn, "careful");
        let colored = format_colored(&record);
        assert!(colored.starts_with("2026-01-21 14:30:45 ["));
        assert!(colored.contains("warn"));
        assert!(colored.ends_with("]: careful"));
    }
}
