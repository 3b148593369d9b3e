//! Reference switch resolution (`/reference:`, `/r:`, `/link:`).
//!
//! All switch occurrences are collected with their original offsets first and
//! the command line is rebuilt once, so removing one occurrence never shifts
//! another.

use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_SWITCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)/(?:reference|r|link):((?:"[^"]*"|[^\s"])+)"#).unwrap()
});

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedReferences {
    /// Command line with unresolved switch occurrences removed.
    pub text: String,
    /// Paths of every kept occurrence, in command line order.
    pub binaries: Vec<String>,
    /// Paths that did not resolve, in command line order.
    pub missing: Vec<String>,
}

/// Paths named by one switch value: an `alias=` prefix is dropped unless the
/// `=` is the final character, then the value is split on `,`.
pub fn reference_paths(value: &str) -> Vec<String> {
    let value = match value.find('=') {
        Some(idx) if idx + 1 < value.len() => &value[idx + 1..],
        _ => value,
    };
    value
        .split(',')
        .map(|path| path.trim().trim_matches('"'))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep a switch only when every path it names exists.
pub fn resolve_references<F>(text: &str, exists: F) -> ResolvedReferences
where
    F: Fn(&str) -> bool,
{
    let mut resolved = ResolvedReferences::default();
    let mut last = 0;

    for caps in REFERENCE_SWITCH_REGEX.captures_iter(text) {
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let (present, absent): (Vec<String>, Vec<String>) = reference_paths(value.as_str())
            .into_iter()
            .partition(|path| exists(path));

        resolved.text.push_str(&text[last..whole.start()]);
        if absent.is_empty() {
            resolved.text.push_str(whole.as_str());
            resolved.binaries.extend(present);
        } else {
            resolved.missing.extend(absent);
        }
        last = whole.end();
    }
    resolved.text.push_str(&text[last..]);
    resolved
}
