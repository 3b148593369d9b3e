use crate::args::OutputFormat;
use crate::presentation::console;
use anyhow::Result;
use buildscan_runtime::PatchService;
use buildscan_types::LogSink;
use std::path::Path;

pub fn handle(manifest: &Path, format: OutputFormat) -> Result<()> {
    let summary = PatchService::new(&LogSink).run(manifest)?;

    match format {
        OutputFormat::Plain => console::print_patch_summary(&summary),
        OutputFormat::Json => console::print_json(&summary)?,
    }
    Ok(())
}
