//! Logging configuration
//!
//! The level comes from `LOG_LEVEL` (default `info`). Unless a config file
//! lists sinks explicitly, the standard set is used: console, `error.log`,
//! `combined.log`, and `debug.log` when the level is `debug`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::file_writer::{DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE_BYTES};
use crate::logging::LogLevel;

/// Environment variable holding the global level
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Directory for the standard log files
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Rotation size of the debug log (10 MiB)
pub const DEBUG_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Archives kept for the debug log
pub const DEBUG_MAX_FILES: usize = 3;

/// Where a sink writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Console,
    File,
}

/// Configuration of a single sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    pub destination: Destination,

    /// Minimum level; `None` follows the global level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<LogLevel>,

    /// File path (file sinks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Rotation threshold (file sinks only, default 5 MiB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,

    /// Archives kept after rotation (file sinks only, default 5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl SinkConfig {
    /// A console sink
    pub fn console(min_level: Option<LogLevel>) -> Self {
        Self {
            destination: Destination::Console,
            min_level,
            path: None,
            max_size_bytes: None,
            max_files: None,
        }
    }

    /// A rotating file sink
    pub fn file(
        path: impl Into<PathBuf>,
        min_level: Option<LogLevel>,
        max_size_bytes: u64,
        max_files: usize,
    ) -> Self {
        Self {
            destination: Destination::File,
            min_level,
            path: Some(path.into()),
            max_size_bytes: Some(max_size_bytes),
            max_files: Some(max_files),
        }
    }

    /// Rotation threshold with the default applied
    pub fn effective_max_size(&self) -> u64 {
        self.max_size_bytes.unwrap_or(DEFAULT_MAX_SIZE_BYTES)
    }

    /// Archive count with the default applied
    pub fn effective_max_files(&self) -> usize {
        self.max_files.unwrap_or(DEFAULT_MAX_FILES)
    }
}

/// The sinks every process gets unless configured otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardSink {
    Console,
    ErrorFile,
    CombinedFile,
    DebugFile,
}

impl StandardSink {
    pub const ALL: [StandardSink; 4] = [
        StandardSink::Console,
        StandardSink::ErrorFile,
        StandardSink::CombinedFile,
        StandardSink::DebugFile,
    ];

    /// Whether this sink exists at the given global level
    pub fn enabled_for(self, level: LogLevel) -> bool {
        match self {
            StandardSink::DebugFile => level == LogLevel::Debug,
            _ => true,
        }
    }

    /// Build the sink configuration, placing files under `logs_dir`
    pub fn config(self, logs_dir: &Path) -> SinkConfig {
        match self {
            StandardSink::Console => SinkConfig::console(None),
            StandardSink::ErrorFile => SinkConfig::file(
                logs_dir.join("error.log"),
                Some(LogLevel::Error),
                DEFAULT_MAX_SIZE_BYTES,
                DEFAULT_MAX_FILES,
            ),
            StandardSink::CombinedFile => SinkConfig::file(
                logs_dir.join("combined.log"),
                None,
                DEFAULT_MAX_SIZE_BYTES,
                DEFAULT_MAX_FILES,
            ),
            StandardSink::DebugFile => SinkConfig::file(
                logs_dir.join("debug.log"),
                Some(LogLevel::Debug),
                DEBUG_MAX_SIZE_BYTES,
                DEBUG_MAX_FILES,
            ),
        }
    }
}

/// Top-level logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global minimum level
    #[serde(default)]
    pub level: LogLevel,

    /// Directory for the standard log files
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Colour the level on the console (only when stdout is a terminal)
    #[serde(default = "default_colorize")]
    pub colorize: bool,

    /// Explicit sink list; empty means the standard set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sinks: Vec<SinkConfig>,

    /// A `LOG_LEVEL` value that failed to parse and was replaced by the default
    #[serde(skip)]
    pub rejected_level: Option<String>,
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOGS_DIR)
}

fn default_colorize() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            logs_dir: default_logs_dir(),
            colorize: default_colorize(),
            sinks: Vec::new(),
            rejected_level: None,
        }
    }
}

impl LoggingConfig {
    /// Default configuration at the given level
    pub fn for_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Build the configuration from `LOG_LEVEL`
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
    }

    /// Build the configuration from a raw `LOG_LEVEL` value
    pub fn from_env_value(value: Option<&str>) -> Self {
        let mut config = Self::default();
        config.apply_level_override(value);
        config
    }

    /// Apply a raw `LOG_LEVEL` value. Unset or empty keeps the current level;
    /// an unknown name falls back to `info` and is remembered in `rejected_level`.
    pub fn apply_level_override(&mut self, value: Option<&str>) {
        let Some(raw) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        match raw.parse::<LogLevel>() {
            Ok(level) => {
                self.level = level;
                self.rejected_level = None;
            }
            Err(_) => {
                self.level = LogLevel::default();
                self.rejected_level = Some(raw.to_string());
            }
        }
    }

    /// Parse a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse logging config")
    }

    /// Load configuration from a TOML file, then apply `LOG_LEVEL`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read logging config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_level_override(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists, else from the environment
    pub fn load_or_env(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::from_env())
        }
    }

    /// Whether the debug file sink is part of the standard set
    pub fn debug_file_enabled(&self) -> bool {
        self.sinks.is_empty() && StandardSink::DebugFile.enabled_for(self.level)
    }

    /// The validated list of sinks to build, in order
    pub fn resolved_sinks(&self) -> Result<Vec<SinkConfig>, ConfigError> {
        if self.sinks.is_empty() {
            return Ok(StandardSink::ALL
                .iter()
                .filter(|sink| sink.enabled_for(self.level))
                .map(|sink| sink.config(&self.logs_dir))
                .collect());
        }

        for (index, sink) in self.sinks.iter().enumerate() {
            if sink.destination != Destination::File {
                continue;
            }
            let path = sink
                .path
                .as_ref()
                .ok_or(ConfigError::MissingPath { index })?;
            if sink.effective_max_size() == 0 {
                return Err(ConfigError::ZeroMaxSize { path: path.clone() });
            }
        }
        Ok(self.sinks.clone())
    }
}
