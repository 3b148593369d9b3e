use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::traits::ProjectMetadataReader;

/// State shared by concurrently running log scanners.
///
/// Each map has its own lock. Operations that check and then mutate hold the
/// lock for the whole sequence.
#[derive(Debug, Default)]
pub struct ScanCaches {
    /// Lowercased paths confirmed to exist.
    known_binaries: Mutex<HashSet<String>>,
    /// Unresolved reference path -> assembly names of the invocations that used it.
    missing_references: Mutex<BTreeMap<String, Vec<String>>>,
    /// Lowercased project path -> declared assembly name (`None` when unresolvable).
    project_assemblies: Mutex<HashMap<String, Option<String>>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScanCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known_binary(&self, path: &str) -> bool {
        lock(&self.known_binaries).contains(&path.to_lowercase())
    }

    pub fn remember_binaries<'a, I>(&self, paths: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut known = lock(&self.known_binaries);
        for path in paths {
            known.insert(path.to_lowercase());
        }
    }

    pub fn known_binary_count(&self) -> usize {
        lock(&self.known_binaries).len()
    }

    pub fn record_missing_reference(&self, path: &str, assembly_name: &str) {
        let mut missing = lock(&self.missing_references);
        let referrers = missing.entry(path.to_string()).or_default();
        if !referrers.iter().any(|r| r == assembly_name) {
            referrers.push(assembly_name.to_string());
        }
    }

    pub fn missing_references(&self) -> BTreeMap<String, Vec<String>> {
        lock(&self.missing_references).clone()
    }

    /// Declared assembly name of `project`, cached by path.
    ///
    /// The reader runs outside the lock so scanners reading different
    /// projects do not wait on each other. Two scanners racing on the same
    /// path may both read it; the first result stored wins.
    pub fn project_assembly_name(
        &self,
        project: &Path,
        reader: &dyn ProjectMetadataReader,
    ) -> Option<String> {
        let key = project.to_string_lossy().to_lowercase();
        if let Some(cached) = lock(&self.project_assemblies).get(&key) {
            return cached.clone();
        }

        let name = reader
            .assembly_name(project)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        lock(&self.project_assemblies)
            .entry(key)
            .or_insert(name)
            .clone()
    }
}
