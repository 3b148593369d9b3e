use serde::Serialize;
use std::path::{Path, PathBuf};

use buildscan_engine::FlatArtifacts;

use crate::Result;

pub const REPORT_FILE: &str = "report.json";

/// Write the four flat lists into `dir`, creating it if needed.
pub fn write_artifacts(dir: &Path, artifacts: &FlatArtifacts) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (name, contents) in artifacts.files() {
        let path = dir.join(name);
        std::fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_report<T: Serialize>(dir: &Path, report: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
