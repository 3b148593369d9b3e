//! Bulk rewrite of a fixed-width marker at recorded byte offsets.
//!
//! Files are independent: each is patched on the rayon pool while holding an
//! exclusive lock on it. Problems with one offset or one file are reported
//! and skipped.

use fs2::FileExt;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use buildscan_types::DiagnosticSink;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchManifest {
    pub marker: String,
    pub replacement: String,
    /// File -> byte offsets where `marker` starts.
    pub files: BTreeMap<PathBuf, Vec<u64>>,
}

impl PatchManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: PatchManifest = serde_json::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker.is_empty() {
            return Err(Error::Patch("marker must not be empty".to_string()));
        }
        if self.marker.len() != self.replacement.len() {
            return Err(Error::Patch(format!(
                "replacement is {} bytes but marker is {} bytes",
                self.replacement.len(),
                self.marker.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchSummary {
    pub files: usize,
    pub patched_offsets: usize,
    pub skipped_offsets: usize,
    pub failed_files: usize,
}

impl PatchSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            files: self.files + other.files,
            patched_offsets: self.patched_offsets + other.patched_offsets,
            skipped_offsets: self.skipped_offsets + other.skipped_offsets,
            failed_files: self.failed_files + other.failed_files,
        }
    }
}

pub fn apply_patch(manifest: &PatchManifest, sink: &dyn DiagnosticSink) -> Result<PatchSummary> {
    manifest.validate()?;
    let marker = manifest.marker.as_bytes();
    let replacement = manifest.replacement.as_bytes();

    let summary = manifest
        .files
        .par_iter()
        .map(|(path, offsets)| match patch_file(path, offsets, marker, replacement, sink) {
            Ok(summary) => summary,
            Err(err) => {
                sink.exception(&format!("Failed to patch {}: {}", path.display(), err));
                PatchSummary {
                    files: 1,
                    failed_files: 1,
                    ..Default::default()
                }
            }
        })
        .reduce(PatchSummary::default, PatchSummary::merge);

    log::info!(
        "Patched {} offsets in {} files ({} skipped, {} files failed)",
        summary.patched_offsets,
        summary.files,
        summary.skipped_offsets,
        summary.failed_files
    );
    Ok(summary)
}

fn patch_file(
    path: &Path,
    offsets: &[u64],
    marker: &[u8],
    replacement: &[u8],
    sink: &dyn DiagnosticSink,
) -> std::io::Result<PatchSummary> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.lock_exclusive()?;

    let mut summary = PatchSummary {
        files: 1,
        ..Default::default()
    };
    for &offset in offsets {
        if marker_at(&mut file, offset, marker)? {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(replacement)?;
            summary.patched_offsets += 1;
        } else {
            sink.message(&format!(
                "Marker not found at offset {} in {}",
                offset,
                path.display()
            ));
            summary.skipped_offsets += 1;
        }
    }
    file.flush()?;
    FileExt::unlock(&file)?;
    Ok(summary)
}

fn marker_at(file: &mut File, offset: u64, marker: &[u8]) -> std::io::Result<bool> {
    let mut buffer = vec![0u8; marker.len()];
    file.seek(SeekFrom::Start(offset))?;
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == marker),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscan_types::MemorySink;
    use tempfile::TempDir;

    fn manifest(files: BTreeMap<PathBuf, Vec<u64>>) -> PatchManifest {
        PatchManifest {
            marker: "XXXXXXXX".to_string(),
            replacement: "00000042".to_string(),
            files,
        }
    }

    #[test]
    fn test_patches_matching_offsets_only() -> Result<()> {
        let temp = TempDir::new()?;
        let a = temp.path().join("a.html");
        let b = temp.path().join("b.html");
        std::fs::write(&a, "<a id=XXXXXXXX>XXXXXXXX</a>")?;
        std::fs::write(&b, "XXXXXXXX")?;

        let files = BTreeMap::from([
            (a.clone(), vec![6, 15, 2, 100]),
            (b.clone(), vec![0]),
            (temp.path().join("missing.html"), vec![0]),
        ]);
        let sink = MemorySink::new();
        let summary = apply_patch(&manifest(files), &sink)?;

        assert_eq!(
            summary,
            PatchSummary {
                files: 3,
                patched_offsets: 3,
                skipped_offsets: 2,
                failed_files: 1,
            }
        );
        assert_eq!(std::fs::read_to_string(&a)?, "<a id=00000042>00000042</a>");
        assert_eq!(std::fs::read_to_string(&b)?, "00000042");
        assert_eq!(sink.exceptions().len(), 1);
        Ok(())
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let mut bad = manifest(BTreeMap::new());
        bad.replacement = "42".to_string();
        let sink = MemorySink::new();
        assert!(matches!(apply_patch(&bad, &sink), Err(Error::Patch(_))));
    }

    #[test]
    fn test_load_manifest_from_json() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("patch.json");
        std::fs::write(
            &path,
            r#"{ "marker": "XXXX", "replacement": "0042", "files": { "/out/a.html": [120, 4096] } }"#,
        )?;

        let loaded = PatchManifest::load(&path)?;
        assert_eq!(loaded.files[Path::new("/out/a.html")], vec![120, 4096]);
        Ok(())
    }
}
