//! State owned by one analysis run.
//!
//! Each map sits behind its own lock and is only reachable through narrow
//! operations (insert-if-absent, multimap append, snapshot), so concurrent
//! scanners and the fold can share one `&AnalysisContext`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use buildscan_core::{eq_ignore_case, file_stem};
use buildscan_parser::scanner::intermediate_key;
use buildscan_parser::{CopyEvent, ProjectEvent, ScanCaches};
use buildscan_types::{Invocation, InvocationKey};

/// A name and the values recorded against it, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameGroup {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug)]
struct Bucket<T> {
    name: String,
    members: Vec<T>,
}

impl<T> Bucket<T> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
        }
    }
}

impl Bucket<String> {
    fn push_distinct(&mut self, value: &str) {
        if !self.members.iter().any(|m| eq_ignore_case(m, value)) {
            self.members.push(value.to_string());
        }
    }
}

#[derive(Debug, Default)]
struct FinalSet {
    list: Vec<Invocation>,
    index: HashMap<InvocationKey, usize>,
}

/// What happened to an invocation offered to the final set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    /// TypeScript inputs folded into the existing TypeScript record.
    Merged,
    /// Same identity as an existing record; both are kept in the ambiguity bucket.
    Collided,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct AnalysisContext {
    caches: ScanCaches,
    /// Intermediate path key -> final destination.
    intermediate_outputs: Mutex<BTreeMap<String, String>>,
    /// Lowercased assembly name -> project paths, first recorded first.
    assembly_projects: Mutex<BTreeMap<String, Bucket<String>>>,
    finals: Mutex<FinalSet>,
    ambiguous_invocations: Mutex<BTreeMap<String, Bucket<Invocation>>>,
    ambiguous_destinations: Mutex<BTreeMap<String, Bucket<String>>>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caches(&self) -> &ScanCaches {
        &self.caches
    }

    /// Record a copy event. On a conflicting destination the shorter one is
    /// kept (ties keep the existing one) and both are recorded as ambiguous.
    ///
    /// Returns `true` when the event conflicted with an earlier mapping.
    pub fn record_copy(&self, copy: &CopyEvent) -> bool {
        let mut outputs = lock(&self.intermediate_outputs);
        let existing = match outputs.get(&copy.key()) {
            None => {
                outputs.insert(copy.key(), copy.destination.clone());
                return false;
            }
            Some(existing) if eq_ignore_case(existing, &copy.destination) => return false,
            Some(existing) => existing.clone(),
        };

        if copy.destination.len() < existing.len() {
            outputs.insert(copy.key(), copy.destination.clone());
        }

        let name = file_stem(&copy.destination);
        let mut ambiguous = lock(&self.ambiguous_destinations);
        let bucket = ambiguous
            .entry(name.to_lowercase())
            .or_insert_with(|| Bucket::new(name));
        bucket.push_distinct(&existing);
        bucket.push_distinct(&copy.destination);
        true
    }

    pub fn destination_for(&self, intermediate: &str) -> Option<String> {
        lock(&self.intermediate_outputs)
            .get(&intermediate_key(intermediate))
            .cloned()
    }

    /// Snapshot of the intermediate key -> destination map.
    pub fn intermediate_outputs(&self) -> Vec<(String, String)> {
        lock(&self.intermediate_outputs)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn record_project(&self, project: &ProjectEvent) {
        let mut projects = lock(&self.assembly_projects);
        projects
            .entry(project.assembly_name.to_lowercase())
            .or_insert_with(|| Bucket::new(&project.assembly_name))
            .push_distinct(&project.project_file_path);
    }

    /// First project recorded for `assembly_name`.
    pub fn project_for(&self, assembly_name: &str) -> Option<String> {
        lock(&self.assembly_projects)
            .get(&assembly_name.to_lowercase())
            .and_then(|bucket| bucket.members.first().cloned())
    }

    pub fn assembly_projects(&self) -> Vec<NameGroup> {
        snapshot_groups(&lock(&self.assembly_projects))
    }

    pub fn ambiguous_destinations(&self) -> Vec<NameGroup> {
        snapshot_groups(&lock(&self.ambiguous_destinations))
    }

    pub fn insert_final(&self, invocation: Invocation) -> Insertion {
        let key = invocation.key();
        let mut finals = lock(&self.finals);
        let found = finals.index.get(&key).copied();
        let Some(idx) = found else {
            let idx = finals.list.len();
            finals.index.insert(key, idx);
            finals.list.push(invocation);
            return Insertion::Added;
        };

        let existing = &mut finals.list[idx];
        if existing.is_typescript() && invocation.is_typescript() {
            if let (Some(target), Some(source)) =
                (existing.compilation_mut(), invocation.compilation())
            {
                for input in &source.input_files {
                    if !target.input_files.iter().any(|i| eq_ignore_case(i, input)) {
                        target.input_files.push(input.clone());
                    }
                }
            }
            return Insertion::Merged;
        }

        let name = invocation.assembly_name().to_string();
        let mut ambiguous = lock(&self.ambiguous_invocations);
        let bucket = ambiguous
            .entry(name.to_lowercase())
            .or_insert_with(|| Bucket::new(&name));
        if bucket.members.is_empty() {
            bucket.members.push(existing.clone());
        }
        bucket.members.push(invocation);
        Insertion::Collided
    }

    /// Drop ambiguity buckets whose members all share one output path.
    ///
    /// Returns the number of buckets removed.
    pub fn prune_harmless_ambiguities(&self) -> usize {
        let mut ambiguous = lock(&self.ambiguous_invocations);
        let before = ambiguous.len();
        ambiguous.retain(|_, bucket| distinct_outputs(&bucket.members).len() > 1);
        before - ambiguous.len()
    }

    /// Ambiguity buckets as (assembly name, members).
    pub fn ambiguous_invocations(&self) -> Vec<(String, Vec<Invocation>)> {
        lock(&self.ambiguous_invocations)
            .values()
            .map(|bucket| (bucket.name.clone(), bucket.members.clone()))
            .collect()
    }

    /// Canonical records in insertion order, followed by the extra members of
    /// every genuinely ambiguous bucket (one per distinct output path).
    pub fn final_invocations(&self) -> Vec<Invocation> {
        let mut list = lock(&self.finals).list.clone();
        for bucket in lock(&self.ambiguous_invocations).values() {
            let Some((canonical, others)) = bucket.members.split_first() else {
                continue;
            };
            let mut seen = vec![output_of(canonical)];
            for member in others {
                let output = output_of(member);
                if !seen.contains(&output) {
                    seen.push(output);
                    list.push(member.clone());
                }
            }
        }
        list
    }
}

fn output_of(invocation: &Invocation) -> String {
    invocation
        .output_assembly_path()
        .unwrap_or_default()
        .to_lowercase()
}

fn distinct_outputs(members: &[Invocation]) -> Vec<String> {
    let mut outputs: Vec<String> = Vec::new();
    for member in members {
        let output = output_of(member);
        if !outputs.contains(&output) {
            outputs.push(output);
        }
    }
    outputs
}

fn snapshot_groups(map: &BTreeMap<String, Bucket<String>>) -> Vec<NameGroup> {
    map.values()
        .map(|bucket| NameGroup {
            name: bucket.name.clone(),
            members: bucket.members.clone(),
        })
        .collect()
}
