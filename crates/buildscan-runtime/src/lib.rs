pub mod config;
pub mod discovery;
mod error;
pub mod patch;
pub mod services;
pub mod storage;

pub use config::{AnalysisConfig, Config, OutputConfig};
pub use error::{Error, Result};
pub use patch::{PatchManifest, PatchSummary};
pub use services::{AnalyzeProgress, AnalyzeRequest, AnalyzeService, AnalyzeSummary, PatchService};
