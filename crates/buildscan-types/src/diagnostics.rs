//! Structured log sink for analysis diagnostics.
//!
//! Diagnostics are classified as plain messages or exceptions. The
//! classification only changes how a diagnostic is displayed; analysis never
//! branches on it.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Message,
    Exception,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub text: String,
}

/// Receiver of informational and exception-classified diagnostics.
///
/// Shared by concurrently running log scanners, hence `Send + Sync`.
pub trait DiagnosticSink: Send + Sync {
    fn message(&self, text: &str);
    fn exception(&self, text: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn message(&self, text: &str) {
        log::info!("{}", text);
    }

    fn exception(&self, text: &str) {
        log::warn!("{}", text);
    }
}

/// Keeps every diagnostic in memory, in arrival order.
///
/// Also forwards to the `log` facade at debug level so `RUST_LOG=debug` still
/// shows them.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: DiagnosticKind, text: &str) {
        log::debug!("{:?}: {}", kind, text);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Diagnostic {
            kind,
            text: text.to_string(),
        });
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn exceptions(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter(|d| d.kind == DiagnosticKind::Exception)
            .map(|d| d.text)
            .collect()
    }

    /// True when any diagnostic contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.snapshot().iter().any(|d| d.text.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn message(&self, text: &str) {
        self.push(DiagnosticKind::Message, text);
    }

    fn exception(&self, text: &str) {
        self.push(DiagnosticKind::Exception, text);
    }
}
