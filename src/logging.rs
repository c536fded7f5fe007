//! Append-only event log.
//!
//! One line per event: RFC 3339 timestamp, level, message. Initialised once
//! from the `[logging]` config section; before that (library use, tests)
//! every call is a no-op. All I/O is best-effort.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use chrono::Utc;

use crate::config::{self, schema::LoggingConfig};

/// Event severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Parse a level name (case-insensitive).
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

struct Sink {
    path: PathBuf,
    min_level: Level,
    // serializes appends from the scheduled task threads
    lock: Mutex<()>,
}

static SINK: OnceLock<Option<Sink>> = OnceLock::new();

/// Initialise the event log. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let _ = SINK.set(build_sink(config));
}

fn build_sink(config: &LoggingConfig) -> Option<Sink> {
    if !config.enabled {
        return None;
    }
    Some(Sink {
        path: config::expand_home(&config.path)?,
        min_level: Level::parse(&config.level).unwrap_or(Level::Info),
        lock: Mutex::new(()),
    })
}

/// Path of the active event log, if logging is initialised and enabled.
pub fn log_path() -> Option<PathBuf> {
    SINK.get()?.as_ref().map(|sink| sink.path.clone())
}

/// Record an event at the given level.
pub fn event(level: Level, message: &str) {
    let Some(Some(sink)) = SINK.get() else {
        return;
    };
    if level < sink.min_level {
        return;
    }
    let _guard = sink.lock.lock();
    let _ = append_line(&sink.path, &format_line(level, message));
}

pub fn debug(message: &str) {
    event(Level::Debug, message);
}

pub fn info(message: &str) {
    event(Level::Info, message);
}

pub fn warn(message: &str) {
    event(Level::Warn, message);
}

pub fn error(message: &str) {
    event(Level::Error, message);
}

fn format_line(level: Level, message: &str) -> String {
    let flat = message.replace(['\r', '\n'], " ");
    format!("{} {:<5} {}", Utc::now().to_rfc3339(), level.as_str(), flat)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_and_order() {
        assert_eq!(Level::parse("INFO"), Some(Level::Info));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("trace"), None);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn disabled_config_builds_no_sink() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(build_sink(&config).is_none());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = LoggingConfig {
            enabled: true,
            path: "/tmp/mapledash-events.log".to_string(),
            level: "loud".to_string(),
        };
        let sink = build_sink(&config).unwrap();
        assert_eq!(sink.min_level, Level::Info);
    }

    #[test]
    fn format_line_flattens_newlines() {
        let line = format_line(Level::Warn, "first\nsecond");
        assert!(line.contains("WARN"));
        assert!(line.ends_with("first second"));
    }

    #[test]
    fn append_line_creates_parent_dirs() {
        let path = std::env::temp_dir()
            .join(format!("mapledash-log-{}", std::process::id()))
            .join("nested")
            .join("events.log");
        append_line(&path, "hello").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hello\n");
    }
}
