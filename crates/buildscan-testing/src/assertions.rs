//! Assertions over the emitted lists and JSON output.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Read a newline-terminated list file into its lines.
pub fn read_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(String::from).collect())
}

/// Assert that a list file holds exactly `expected`, in order.
pub fn assert_list_eq(path: &Path, expected: &[&str]) -> Result<()> {
    let actual = read_list(path)?;
    if actual != expected {
        anyhow::bail!(
            "{} differs\n  expected: {:?}\n  actual:   {:?}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

/// Assert that each line ends with the matching suffix.
///
/// Absolute prefixes depend on the temp directory, so callers compare tails.
pub fn assert_lines_end_with(path: &Path, suffixes: &[&str]) -> Result<()> {
    let actual = read_list(path)?;
    if actual.len() != suffixes.len() {
        anyhow::bail!(
            "{} has {} lines, expected {}: {:?}",
            path.display(),
            actual.len(),
            suffixes.len(),
            actual
        );
    }
    for (i, (line, suffix)) in actual.iter().zip(suffixes).enumerate() {
        if !line.ends_with(suffix) {
            anyhow::bail!("Line {} is {:?}, expected suffix {:?}", i, line, suffix);
        }
    }
    Ok(())
}

/// Assert that a numeric summary field has the expected value.
pub fn assert_count(json: &Value, field: &str, expected: u64) -> Result<()> {
    let actual = json[field]
        .as_u64()
        .with_context(|| format!("Expected numeric '{}' in JSON", field))?;
    if actual != expected {
        anyhow::bail!("Expected {} = {}, got {}", field, expected, actual);
    }
    Ok(())
}
