// Engine module - reconciliation, reporting and flat outputs
// Sits between the per-file parser and the runtime services

pub mod analyzer;
pub mod artifacts;
pub mod augment;
pub mod context;
mod error;
pub mod sanity;
mod validate;

pub use analyzer::{AnalysisOptions, AnalysisOutcome, Analyzer};
pub use artifacts::FlatArtifacts;
pub use augment::metadata_as_source;
pub use context::{AnalysisContext, Insertion, NameGroup};
pub use error::{Error, Result};
pub use sanity::{SanityOptions, SanityReport};
pub use validate::validate_outputs;
