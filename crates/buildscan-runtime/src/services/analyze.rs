use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use buildscan_engine::{
    Analyzer, FlatArtifacts, SanityReport, metadata_as_source, sanity, validate_outputs,
};
use buildscan_parser::MsBuildProjectReader;
use buildscan_types::{Diagnostic, DiagnosticSink, Invocation, MemorySink};

use crate::config::Config;
use crate::discovery::collect_log_files;
use crate::storage::{write_artifacts, write_report};

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    /// Log files or directories containing `*.log` files.
    pub inputs: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub write_report: bool,
}

#[derive(Debug, Clone)]
pub enum AnalyzeProgress {
    LogsDiscovered { count: usize },
    Reconciled { invocations: usize, ambiguous: usize },
    SanityChecked { findings: usize },
    Augmented { synthesized: usize },
    Validated { checked: usize },
    ArtifactWritten { path: PathBuf },
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeSummary {
    pub log_files: usize,
    pub invocations: usize,
    pub synthesized: usize,
    pub findings: usize,
    pub out_dir: PathBuf,
    pub artifacts: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

/// Contents of `report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub summary: &'a AnalyzeSummary,
    pub sanity: &'a SanityReport,
    pub invocations: &'a [Invocation],
    pub diagnostics: Vec<Diagnostic>,
}

/// Forwards to the caller's sink and keeps a copy for the report.
struct RecordingSink<'a> {
    inner: &'a dyn DiagnosticSink,
    memory: MemorySink,
}

impl DiagnosticSink for RecordingSink<'_> {
    fn message(&self, text: &str) {
        self.memory.message(text);
        self.inner.message(text);
    }

    fn exception(&self, text: &str) {
        self.memory.exception(text);
        self.inner.exception(text);
    }
}

pub struct AnalyzeService<'a> {
    config: &'a Config,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> AnalyzeService<'a> {
    pub fn new(config: &'a Config, sink: &'a dyn DiagnosticSink) -> Self {
        Self { config, sink }
    }

    pub fn run<F>(&self, request: &AnalyzeRequest, mut on_progress: F) -> Result<AnalyzeSummary>
    where
        F: FnMut(AnalyzeProgress),
    {
        let sink = RecordingSink {
            inner: self.sink,
            memory: MemorySink::new(),
        };

        let log_files = collect_log_files(&request.inputs).context("Failed to collect build logs")?;
        on_progress(AnalyzeProgress::LogsDiscovered {
            count: log_files.len(),
        });

        let options = self.config.analysis_options();
        let outcome = Analyzer::new(&options, &MsBuildProjectReader, &sink).analyze(&log_files)?;
        on_progress(AnalyzeProgress::Reconciled {
            invocations: outcome.invocations.len(),
            ambiguous: outcome.context.ambiguous_invocations().len(),
        });

        let report = sanity::check(
            &outcome.context,
            &outcome.invocations,
            &self.config.sanity,
            &sink,
        );
        on_progress(AnalyzeProgress::SanityChecked {
            findings: report.finding_count(),
        });

        let mut invocations = outcome.invocations;
        let mut synthesized = 0;
        if self.config.output.augment_metadata_as_source {
            let extra = metadata_as_source(&invocations, &sink);
            synthesized = extra.len();
            invocations.extend(extra);
            on_progress(AnalyzeProgress::Augmented { synthesized });
        }

        if self.config.output.validate_outputs {
            validate_outputs(&invocations)?;
            on_progress(AnalyzeProgress::Validated {
                checked: invocations.len(),
            });
        }

        let artifacts = FlatArtifacts::build(&invocations);
        let written = write_artifacts(&request.out_dir, &artifacts).with_context(|| {
            format!("Failed to write artifacts to {}", request.out_dir.display())
        })?;
        for path in &written {
            on_progress(AnalyzeProgress::ArtifactWritten { path: path.clone() });
        }

        let mut summary = AnalyzeSummary {
            log_files: outcome.log_files,
            invocations: invocations.len(),
            synthesized,
            findings: report.finding_count(),
            out_dir: request.out_dir.clone(),
            artifacts: written,
            report: None,
        };

        if request.write_report {
            let path = request.out_dir.join(crate::storage::REPORT_FILE);
            summary.report = Some(path);
            let document = AnalysisReport {
                summary: &summary,
                sanity: &report,
                invocations: &invocations,
                diagnostics: sink.memory.snapshot(),
            };
            let written = write_report(&request.out_dir, &document)
                .context("Failed to write analysis report")?;
            on_progress(AnalyzeProgress::ArtifactWritten { path: written });
        }

        Ok(summary)
    }
}
