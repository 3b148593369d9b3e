//! Per-file build log scanning.
//!
//! A scan only classifies and parses lines. Copy and project events are
//! returned in line order and applied later by the single-threaded fold, so
//! the only state touched here is [`ScanCaches`].

use std::fs;
use std::path::{Path, PathBuf};

use buildscan_core::{has_extension, strip_drive};
use buildscan_types::{CompilerInvocation, DiagnosticSink};

use crate::caches::ScanCaches;
use crate::error::{Error, Result};
use crate::invocation::{InvocationParser, ParserOptions, match_compiler};
use crate::traits::ProjectMetadataReader;

const COPY_MARKERS: &[&str] = &[r#"Copying file from ""#, r#"Moving file from ""#];
const COPY_DELIMITER: &str = r#"" to ""#;
const DONE_BUILDING_MARKER: &str = "Done Building Project";
const TEMP_PLACING_SEGMENT: &str = r"\tempplacing";

const BINARY_EXTENSIONS: &[&str] = &[".dll", ".exe", ".netmodule"];
const GENERATED_EXTENSIONS: &[&str] = &[".resources.dll", ".xmlserializers.dll"];

/// An intermediate binary copied or moved to its final location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyEvent {
    pub intermediate: String,
    pub destination: String,
}

impl CopyEvent {
    pub fn key(&self) -> String {
        intermediate_key(&self.intermediate)
    }
}

/// A project that finished building, with its declared assembly name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEvent {
    pub project_file_path: String,
    pub assembly_name: String,
}

/// What a single log line contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Copy(CopyEvent),
    /// Quoted project path of a `Done Building Project` line.
    ProjectDone(String),
    Invocation,
    Ignored,
}

/// Everything found in one log file, in line order.
#[derive(Debug, Clone, Default)]
pub struct LogScan {
    pub log_file: PathBuf,
    pub copies: Vec<CopyEvent>,
    pub projects: Vec<ProjectEvent>,
    pub invocations: Vec<CompilerInvocation>,
}

/// Lookup key for intermediate paths: drive designator dropped, lowercased.
pub fn intermediate_key(path: &str) -> String {
    strip_drive(path).to_lowercase()
}

pub fn classify_line(line: &str) -> LineEvent {
    if let Some(event) = parse_copy(line) {
        return event;
    }
    if let Some(idx) = line.find(DONE_BUILDING_MARKER) {
        return match quoted_after(&line[idx + DONE_BUILDING_MARKER.len()..]) {
            Some(project) => LineEvent::ProjectDone(project.to_string()),
            None => LineEvent::Ignored,
        };
    }
    if match_compiler(line).is_some() {
        return LineEvent::Invocation;
    }
    LineEvent::Ignored
}

/// `None` means the line is not a copy event and falls through to the other
/// classifiers.
fn parse_copy(line: &str) -> Option<LineEvent> {
    let start = COPY_MARKERS
        .iter()
        .find_map(|marker| line.find(marker).map(|idx| idx + marker.len()))?;
    let rest = &line[start..];
    let delimiter = rest.find(COPY_DELIMITER)?;

    let destination = rest[delimiter + COPY_DELIMITER.len()..].trim_end_matches(['.', '"']);
    if !BINARY_EXTENSIONS
        .iter()
        .any(|ext| has_extension(destination, ext))
    {
        return Some(LineEvent::Ignored);
    }
    if GENERATED_EXTENSIONS
        .iter()
        .any(|ext| has_extension(destination, ext))
    {
        return None;
    }

    Some(LineEvent::Copy(CopyEvent {
        intermediate: remove_temp_placing(&rest[..delimiter]),
        destination: destination.to_string(),
    }))
}

fn quoted_after(text: &str) -> Option<&str> {
    let open = text.find('"')?;
    let value = &text[open + 1..];
    let close = value.find('"')?;
    Some(&value[..close]).filter(|path| !path.is_empty())
}

fn remove_temp_placing(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    let mut result = String::with_capacity(path.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(TEMP_PLACING_SEGMENT) {
        result.push_str(&path[last..idx]);
        last = idx + TEMP_PLACING_SEGMENT.len();
    }
    result.push_str(&path[last..]);
    result
}

/// Scans one build log.
pub struct LogScanner<'a> {
    options: &'a ParserOptions,
    caches: &'a ScanCaches,
    reader: &'a dyn ProjectMetadataReader,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> LogScanner<'a> {
    pub fn new(
        options: &'a ParserOptions,
        caches: &'a ScanCaches,
        reader: &'a dyn ProjectMetadataReader,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            options,
            caches,
            reader,
            sink,
        }
    }

    /// Read and scan `path`. A log that cannot be read aborts the run.
    pub fn scan_file(&self, path: &Path) -> Result<LogScan> {
        let bytes = fs::read(path).map_err(|e| Error::log_file(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        let scan = self.scan_text(path, text.trim_start_matches('\u{feff}'));
        log::debug!(
            "Scanned {}: {} invocations, {} copies, {} projects",
            path.display(),
            scan.invocations.len(),
            scan.copies.len(),
            scan.projects.len()
        );
        Ok(scan)
    }

    pub fn scan_text(&self, log_file: &Path, text: &str) -> LogScan {
        let parser = InvocationParser::new(self.options, self.caches, self.sink);
        let mut scan = LogScan {
            log_file: log_file.to_path_buf(),
            ..Default::default()
        };

        for line in text.lines() {
            let line = line.trim();
            match classify_line(line) {
                LineEvent::Copy(copy) => scan.copies.push(copy),
                LineEvent::ProjectDone(project) => {
                    if let Some(event) = self.project_event(&project) {
                        scan.projects.push(event);
                    }
                }
                LineEvent::Invocation => {
                    if let Some(invocation) = parser.parse(line) {
                        if !invocation.is_typescript() {
                            self.caches
                                .remember_binaries(&invocation.referenced_binaries);
                        }
                        scan.invocations.push(invocation);
                    }
                }
                LineEvent::Ignored => {}
            }
        }
        scan
    }

    fn project_event(&self, project: &str) -> Option<ProjectEvent> {
        let path = Path::new(project);
        if !path.exists() {
            self.sink
                .message(&format!("Project file not found: {}", project));
            return None;
        }
        let Some(assembly_name) = self.caches.project_assembly_name(path, self.reader) else {
            self.sink
                .message(&format!("Unable to determine assembly name of {}", project));
            return None;
        };
        let project_file_path = match std::path::absolute(path) {
            Ok(absolute) => absolute.to_string_lossy().into_owned(),
            Err(_) => project.to_string(),
        };
        Some(ProjectEvent {
            project_file_path,
            assembly_name,
        })
    }
}
