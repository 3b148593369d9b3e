pub mod analyze;
pub mod patch;

pub use analyze::{AnalysisReport, AnalyzeProgress, AnalyzeRequest, AnalyzeService, AnalyzeSummary};
pub use patch::PatchService;
