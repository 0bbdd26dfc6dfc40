//! Diagnostic sink handed to the import and transform engines
//!
//! The engines never log on their own; whoever builds them decides where
//! progress and recoverable errors go.

use std::sync::{Arc, Mutex};

/// Severity of a reported line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Receives progress messages and recoverable errors
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Forwards everything to the `tracing` subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!(target: "importman", "{}", message),
            Level::Error => tracing::warn!(target: "importman", "{}", message),
        }
    }
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _level: Level, _message: &str) {}
}

/// Keeps reported lines in memory (used by tests and by callers that show a log pane)
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Messages reported at `Level::Error`
    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

/// Shared handle type accepted by the engine constructors
pub type SharedReporter = Arc<dyn Reporter>;

/// Default reporter for callers that don't care
pub fn tracing_reporter() -> SharedReporter {
    Arc::new(TracingReporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_splits_errors() {
        let reporter = MemoryReporter::new();
        reporter.info("parsed folder");
        reporter.error("bad item");
        assert_eq!(reporter.lines().len(), 2);
        assert_eq!(reporter.errors(), vec!["bad item".to_string()]);
    }

    #[test]
    fn test_tracing_reporter_is_shareable() {
        let reporter = tracing_reporter();
        let clone = Arc::clone(&reporter);
        clone.info("imported 3 requests");
        reporter.error("bad item");
        assert_eq!(Arc::strong_count(&reporter), 2);
    }
}
