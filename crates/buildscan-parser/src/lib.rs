// Error types
pub mod error;

// Collaborator contracts
pub mod traits;

// Scan-time shared state
pub mod caches;

// Compiler command line parsing
pub mod invocation;

// Project file metadata
pub mod project;

// Per-file log scanning
pub mod scanner;

pub use caches::ScanCaches;
pub use error::{Error, Result};
pub use invocation::{InvocationParser, ParserOptions};
pub use project::MsBuildProjectReader;
pub use scanner::{CopyEvent, LineEvent, LogScan, LogScanner, ProjectEvent};
pub use traits::ProjectMetadataReader;
