use anyhow::Result;
use buildscan_runtime::{AnalyzeProgress, AnalyzeSummary, PatchSummary};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;

fn colored() -> bool {
    std::io::stdout().is_terminal()
}

fn label(text: &str) -> String {
    if colored() {
        text.cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

fn count(value: usize, warn_when_nonzero: bool) -> String {
    if !colored() {
        return value.to_string();
    }
    if warn_when_nonzero && value > 0 {
        value.yellow().bold().to_string()
    } else {
        value.green().to_string()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_analyze_progress(progress: &AnalyzeProgress) {
    match progress {
        AnalyzeProgress::LogsDiscovered { count } => {
            println!("Scanning {} build logs", count);
        }
        AnalyzeProgress::Reconciled {
            invocations,
            ambiguous,
        } => {
            println!(
                "Reconciled {} invocations ({} ambiguous assemblies)",
                invocations, ambiguous
            );
        }
        AnalyzeProgress::SanityChecked { findings } => {
            println!("Sanity checks: {} findings", findings);
        }
        AnalyzeProgress::Augmented { synthesized } => {
            println!("Metadata-as-source: {} synthesized", synthesized);
        }
        AnalyzeProgress::Validated { checked } => {
            println!("Validated {} output assemblies", checked);
        }
        AnalyzeProgress::ArtifactWritten { path } => {
            println!("  wrote {}", path.display());
        }
    }
}

pub fn print_analyze_summary(summary: &AnalyzeSummary) {
    println!();
    println!("{}", label("Analysis complete"));
    println!("  Log files:    {}", summary.log_files);
    println!("  Invocations:  {}", count(summary.invocations, false));
    println!("  Synthesized:  {}", count(summary.synthesized, false));
    println!("  Findings:     {}", count(summary.findings, true));
    println!("  Output:       {}", summary.out_dir.display());
    if let Some(report) = &summary.report {
        println!("  Report:       {}", report.display());
    }
}

pub fn print_patch_summary(summary: &PatchSummary) {
    println!("{}", label("Patch complete"));
    println!("  Files:        {}", summary.files);
    println!("  Patched:      {}", count(summary.patched_offsets, false));
    println!("  Skipped:      {}", count(summary.skipped_offsets, true));
    println!("  Failed files: {}", count(summary.failed_files, true));
}
