use anyhow::{Context, Result};
use std::path::Path;

use buildscan_types::DiagnosticSink;

use crate::patch::{PatchManifest, PatchSummary, apply_patch};

pub struct PatchService<'a> {
    sink: &'a dyn DiagnosticSink,
}

impl<'a> PatchService<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    pub fn run(&self, manifest_path: &Path) -> Result<PatchSummary> {
        let manifest = PatchManifest::load(manifest_path)
            .with_context(|| format!("Failed to load patch manifest {}", manifest_path.display()))?;
        let summary = apply_patch(&manifest, self.sink)?;
        Ok(summary)
    }
}
