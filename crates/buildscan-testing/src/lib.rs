//! Testing infrastructure for buildscan integration tests.
//!
//! - `TestWorld`: isolated build tree plus CLI execution
//! - `fixtures`: build log and project file generation
//! - `assertions`: checks over the emitted lists and JSON output

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use fixtures::LogBuilder;
pub use world::{CliResult, TestWorld};
