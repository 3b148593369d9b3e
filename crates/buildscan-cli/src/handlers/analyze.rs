use crate::args::OutputFormat;
use crate::presentation::console;
use anyhow::Result;
use buildscan_runtime::{AnalyzeRequest, AnalyzeService, Config};
use buildscan_types::LogSink;

pub fn handle(config: &Config, request: &AnalyzeRequest, format: OutputFormat) -> Result<()> {
    let service = AnalyzeService::new(config, &LogSink);

    let summary = service.run(request, |progress| {
        if format == OutputFormat::Plain {
            console::print_analyze_progress(&progress);
        }
    })?;

    match format {
        OutputFormat::Plain => console::print_analyze_summary(&summary),
        OutputFormat::Json => console::print_json(&summary)?,
    }
    Ok(())
}
