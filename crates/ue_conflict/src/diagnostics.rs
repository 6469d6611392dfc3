//! Growable diagnostic log for a scan.
//!
//! Every discovery, mount and attribution decision is recorded here and also
//! forwarded to `tracing`, so the same lines show up in the console and in the
//! [`ModConflictResult`](crate::ModConflictResult) handed to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Trace,
    Debug,
    Info,
    Warn,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticLevel::Trace => "TRACE",
            DiagnosticLevel::Debug => "DEBUG",
            DiagnosticLevel::Info => "INFO",
            DiagnosticLevel::Warn => "WARN",
        };
        f.pad(s)
    }
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEntry {
    /// Local wall-clock time, `HH:MM:SS.mmm`.
    pub timestamp: String,
    pub level: DiagnosticLevel,
    /// What the line is about: a mod real name, `"scan"`, `"base"`, ...
    pub scope: String,
    pub message: String,
}

impl fmt::Display for DiagnosticEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5} [{}] {}",
            self.timestamp, self.level, self.scope, self.message
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Vec<DiagnosticEntry>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: DiagnosticLevel, scope: &str, message: impl Into<String>) {
        let message = message.into();
        match level {
            DiagnosticLevel::Trace => tracing::trace!("[{}] {}", scope, message),
            DiagnosticLevel::Debug => tracing::debug!("[{}] {}", scope, message),
            DiagnosticLevel::Info => tracing::info!("[{}] {}", scope, message),
            DiagnosticLevel::Warn => tracing::warn!("[{}] {}", scope, message),
        }
        self.entries.push(DiagnosticEntry {
            timestamp: chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            level,
            scope: scope.to_string(),
            message,
        });
    }

    pub fn trace(&mut self, scope: &str, message: impl Into<String>) {
        self.record(DiagnosticLevel::Trace, scope, message);
    }

    pub fn debug(&mut self, scope: &str, message: impl Into<String>) {
        self.record(DiagnosticLevel::Debug, scope, message);
    }

    pub fn info(&mut self, scope: &str, message: impl Into<String>) {
        self.record(DiagnosticLevel::Info, scope, message);
    }

    pub fn warn(&mut self, scope: &str, message: impl Into<String>) {
        self.record(DiagnosticLevel::Warn, scope, message);
    }

    /// Append another log, keeping its entries in order.
    pub fn extend(&mut self, other: DiagnosticLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DiagnosticEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_order_and_scope() {
        let mut log = DiagnosticLog::new();
        log.info("scan", "starting");
        log.warn("Hero_A", "no containers");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, DiagnosticLevel::Info);
        assert_eq!(entries[1].scope, "Hero_A");
        assert_eq!(entries[1].message, "no containers");
        assert_eq!(entries[0].timestamp.len(), "12:34:56.789".len());
    }

    #[test]
    fn test_extend_appends() {
        let mut a = DiagnosticLog::new();
        a.debug("a", "one");
        let mut b = DiagnosticLog::new();
        b.debug("b", "two");
        a.extend(b);
        let scopes: Vec<_> = a.entries().iter().map(|e| e.scope.as_str()).collect();
        assert_eq!(scopes, ["a", "b"]);
    }

    #[test]
    fn test_display_format() {
        let entry = DiagnosticEntry {
            timestamp: "10:00:00.000".into(),
            level: DiagnosticLevel::Warn,
            scope: "base".into(),
            message: "missing".into(),
        };
        assert_eq!(entry.to_string(), "10:00:00.000 WARN  [base] missing");
    }
}
