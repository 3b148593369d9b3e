//! Path text helpers.
//!
//! Build logs are produced on Windows but may be analyzed anywhere, so these
//! helpers work on path *text* and accept both `\` and `/` as separators
//! instead of relying on the host's `std::path` rules.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. BUILDSCAN_PATH environment variable (with tilde expansion)
/// 3. System data directory (recommended default)
/// 4. ~/.buildscan (fallback for systems without standard data directory)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("BUILDSCAN_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("buildscan"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".buildscan"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or system data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Last path component, after the final `\` or `/`.
pub fn file_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// File name without its final extension.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Directory portion of `path`, without the trailing separator.
pub fn parent(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(0) => &path[..1],
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// ASCII case-insensitive suffix test on the file name.
pub fn has_extension(path: &str, extension: &str) -> bool {
    let name = file_name(path);
    name.len() > extension.len()
        && name.is_char_boundary(name.len() - extension.len())
        && name[name.len() - extension.len()..].eq_ignore_ascii_case(extension)
}

/// `X:\` or `X:/` at the start of the path.
pub fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Drop a leading drive designator (`C:`), keeping the root separator.
pub fn strip_drive(path: &str) -> &str {
    if has_drive_prefix(path) {
        &path[2..]
    } else {
        path
    }
}

/// Absolute on either Windows (`C:\`, `\\server`, `\rooted`) or Unix (`/`).
pub fn is_absolute(path: &str) -> bool {
    has_drive_prefix(path) || path.starts_with('\\') || path.starts_with('/')
}

/// The separator style used by `path`; backslash wins when both appear.
pub fn separator_of(path: &str) -> char {
    if path.contains('\\') || has_drive_prefix(path) {
        '\\'
    } else {
        '/'
    }
}

/// Case-insensitive comparison used for every path and assembly name key.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Lexically fold `.` and `..` segments and duplicate separators.
///
/// The prefix (drive, UNC `\\`, or root) is preserved and `..` never climbs
/// above it. All separators are rewritten to the path's own style.
pub fn normalize(path: &str) -> String {
    let sep = separator_of(path);

    let (prefix, rest) = if has_drive_prefix(path) {
        (format!("{}{}", &path[..2], sep), &path[3..])
    } else if path.starts_with("\\\\") || path.starts_with("//") {
        (format!("{}{}", sep, sep), &path[2..])
    } else if path.starts_with(is_separator) {
        (sep.to_string(), &path[1..])
    } else {
        (String::new(), path)
    };
    let rooted = !prefix.is_empty();

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut normalized = prefix;
    normalized.push_str(&segments.join(&sep.to_string()));
    normalized
}

/// Resolve `relative` against `base` and normalize.
///
/// An already absolute `relative` is only normalized. Separators follow the
/// style of `base`.
pub fn join(base: &str, relative: &str) -> String {
    if is_absolute(relative) || base.is_empty() {
        return normalize(relative);
    }
    let sep = separator_of(base);
    let relative: String = relative
        .chars()
        .map(|c| if is_separator(c) { sep } else { c })
        .collect();
    if base.ends_with(is_separator) {
        normalize(&format!("{}{}", base, relative))
    } else {
        normalize(&format!("{}{}{}", base, sep, relative))
    }
}

/// Remove a fixed-width drive prefix such as `C:\` for display.
pub fn trim_drive_prefix(path: &str) -> &str {
    if has_drive_prefix(path) {
        &path[3..]
    } else {
        path
    }
}
