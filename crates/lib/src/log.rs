//! Transformation log sinks.
//!
//! Merge handlers report non-fatal diagnostics (defaults applied, ignored
//! parameters) through a [`TransformationLog`] instead of failing. Two sinks
//! are provided: [`TracingLog`] forwards to `tracing`, [`MemoryLog`] keeps the
//! messages for later inspection.

use std::sync::{Mutex, PoisonError};

/// Severity of a transformation log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for human-readable diagnostics produced during a merge operation.
pub trait TransformationLog {
    /// Records a message at the given level.
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards transformation log messages to `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingLog {
    operation: String,
}

impl TracingLog {
    /// Creates a sink tagging every event with `operation`.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl TransformationLog for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        let operation = self.operation.as_str();
        match level {
            LogLevel::Info => tracing::info!(operation, "{message}"),
            LogLevel::Warn => tracing::warn!(operation, "{message}"),
            LogLevel::Error => tracing::error!(operation, "{message}"),
        }
    }
}

/// A single captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Captures transformation log messages in memory.
///
/// Messages are also emitted as `debug` tracing events.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured entries, in logging order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages captured at exactly `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Returns true if any error was logged.
    pub fn has_errors(&self) -> bool {
        !self.messages(LogLevel::Error).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl TransformationLog for MemoryLog {
    fn log(&self, level: LogLevel, message: &str) {
        tracing::debug!(%level, "{message}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
            });
    }
}
