//! Flat text lists consumed by downstream generation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use buildscan_core::{eq_ignore_case, file_name, file_stem, has_drive_prefix, trim_drive_prefix};
use buildscan_types::{DETACHED_MARKER, Invocation};

pub const INVOCATIONS_FILE: &str = "invocations.txt";
pub const PROJECTS_FILE: &str = "projects.txt";
pub const ASSEMBLIES_FILE: &str = "assemblies.txt";
pub const ASSEMBLY_PATHS_FILE: &str = "assembly_paths.txt";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatArtifacts {
    /// Three lines per invocation: project, output assembly, command line.
    pub invocations: String,
    pub projects: String,
    pub assemblies: String,
    pub assembly_paths: String,
}

impl FlatArtifacts {
    pub fn build(invocations: &[Invocation]) -> Self {
        let mut sorted: Vec<&Invocation> = invocations.iter().collect();
        sorted.sort_by_key(|invocation| invocation.assembly_name().to_lowercase());

        let invocation_lines = sorted.iter().flat_map(|invocation| {
            [
                invocation.project_file_path().to_string(),
                invocation
                    .output_assembly_path()
                    .unwrap_or(DETACHED_MARKER)
                    .to_string(),
                invocation.command_line().to_string(),
            ]
        });

        let mut projects: Vec<&str> = Vec::new();
        for invocation in &sorted {
            let project = invocation.project_file_path();
            if project != DETACHED_MARKER && !projects.iter().any(|p| eq_ignore_case(p, project)) {
                projects.push(project);
            }
        }
        projects.sort_by_key(|project| project.to_lowercase());
        let projects = projects.into_iter().map(|project| {
            if has_drive_prefix(project) {
                trim_drive_prefix(project)
            } else {
                project
            }
        });

        let mut assemblies: BTreeMap<String, &str> = BTreeMap::new();
        for invocation in &sorted {
            assemblies
                .entry(invocation.assembly_name().to_lowercase())
                .or_insert(invocation.assembly_name());
        }

        Self {
            invocations: lines(invocation_lines),
            projects: lines(projects),
            assemblies: lines(assemblies.values()),
            assembly_paths: lines(assembly_paths(&sorted)),
        }
    }

    /// (file name, contents) pairs in a stable order.
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            (INVOCATIONS_FILE, self.invocations.as_str()),
            (PROJECTS_FILE, self.projects.as_str()),
            (ASSEMBLIES_FILE, self.assemblies.as_str()),
            (ASSEMBLY_PATHS_FILE, self.assembly_paths.as_str()),
        ]
    }
}

/// One path per distinct assembly name across outputs and references.
fn assembly_paths(invocations: &[&Invocation]) -> Vec<String> {
    let mut best: BTreeMap<String, &str> = BTreeMap::new();
    let outputs = invocations
        .iter()
        .filter_map(|invocation| invocation.output_assembly_path());
    let references = invocations
        .iter()
        .flat_map(|invocation| invocation.referenced_binaries())
        .map(String::as_str);

    for path in outputs.chain(references) {
        let name = file_stem(path).to_lowercase();
        match best.get(&name) {
            Some(current) if prefer(current, path) != Ordering::Greater => {}
            _ => {
                best.insert(name, path);
            }
        }
    }
    best.into_values().map(str::to_string).collect()
}

/// Shorter first, then by file name, then by full path.
fn prefer(a: &str, b: &str) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| file_name(a).cmp(file_name(b)))
        .then_with(|| a.cmp(b))
}

fn lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for item in items {
        text.push_str(item.as_ref());
        text.push('\n');
    }
    text
}
