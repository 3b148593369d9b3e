use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::Result;

/// Expand analyze inputs into log files.
///
/// Files are taken as given; directories are walked for `*.log`. The result
/// is sorted and free of duplicates. A missing input, or a directory entry
/// that cannot be read, is an error.
pub fn collect_log_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut logs = Vec::new();
    for input in inputs {
        if input.is_file() {
            logs.push(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.map_err(io::Error::from)?;
                if entry.file_type().is_file() && is_log_file(entry.path()) {
                    logs.push(entry.into_path());
                }
            }
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Log input not found: {}", input.display()),
            )
            .into());
        }
    }
    logs.sort();
    logs.dedup();
    Ok(logs)
}

fn is_log_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("log"))
}
