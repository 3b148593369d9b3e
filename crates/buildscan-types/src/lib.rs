pub mod diagnostics;
pub mod domain;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, LogSink, MemorySink};
pub use domain::*;
