//! Metadata-as-source augmentation.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use buildscan_core::{eq_ignore_case, file_stem};
use buildscan_types::{DiagnosticSink, Invocation};

/// Placeholder invocations for binaries that are referenced but never compiled.
///
/// One invocation per uncompiled assembly name. Among the referencing paths
/// that exist on disk the shortest wins, ties going to the lexicographically
/// greater path.
pub fn metadata_as_source(invocations: &[Invocation], sink: &dyn DiagnosticSink) -> Vec<Invocation> {
    let compiled: HashSet<String> = invocations
        .iter()
        .map(|invocation| invocation.assembly_name().to_lowercase())
        .collect();

    let mut referenced: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for path in invocations.iter().flat_map(Invocation::referenced_binaries) {
        let name = file_stem(path).to_lowercase();
        if compiled.contains(&name) {
            continue;
        }
        let paths = referenced.entry(name).or_default();
        if !paths.iter().any(|p| eq_ignore_case(p, path)) {
            paths.push(path);
        }
    }

    let mut synthesized = Vec::new();
    for (name, paths) in referenced {
        let chosen = paths
            .into_iter()
            .filter(|path| Path::new(path).exists())
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)));
        match chosen {
            Some(path) => synthesized.push(Invocation::synthetic(file_stem(path), path)),
            None => sink.message(&format!(
                "No existing binary for referenced assembly {}",
                name
            )),
        }
    }
    synthesized
}
