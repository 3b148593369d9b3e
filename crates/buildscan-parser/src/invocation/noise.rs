//! Noise-stripping steps applied to a compiler command line.
//!
//! The steps run in a fixed order: each later step assumes the earlier ones
//! already shortened the text.

use regex::Regex;
use std::sync::LazyLock;

use buildscan_core::{file_name, file_stem};

use super::tokenize::token_spans;

static RESOURCE_SWITCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:^|\s)/(?:win32resource|win32res|resource):(?:"[^"]*"|[^\s",]+)(?:,(?:"[^"]*"|[^\s",]+))*"#,
    )
    .unwrap()
});

/// Remove the first token that points into the temporary directory `marker`.
pub fn remove_temp_fragment(text: &str, marker: &str) -> String {
    if marker.is_empty() {
        return text.to_string();
    }
    let lower = text.to_ascii_lowercase();
    let Some(hit) = lower.find(&marker.to_ascii_lowercase()) else {
        return text.to_string();
    };
    let Some(span) = token_spans(text)
        .into_iter()
        .find(|span| span.start <= hit && hit < span.end)
    else {
        return text.to_string();
    };

    let start = match text[..span.start].char_indices().next_back() {
        Some((idx, c)) if c.is_whitespace() => idx,
        _ => span.start,
    };
    format!("{}{}", &text[..start], &text[span.end..])
}

/// Remove every `/resource:`, `/win32res:` and `/win32resource:` switch.
pub fn remove_resources(text: &str) -> String {
    RESOURCE_SWITCH_REGEX.replace_all(text, "").into_owned()
}

/// Result of shortening a path-valued switch to its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedSwitch {
    pub text: String,
    /// Full path, doubled backslashes collapsed.
    pub path: String,
    /// The quoted value had no closing quote.
    pub malformed: bool,
}

impl ShortenedSwitch {
    pub fn assembly_name(&self) -> &str {
        file_stem(&self.path)
    }
}

/// Locate `switch` (e.g. `/out:`) and replace its path value by the file name.
///
/// The quoting style of the value is kept. Returns `None` when the switch is
/// absent or has an empty value.
pub fn shorten_switch(text: &str, switch: &str) -> Option<ShortenedSwitch> {
    let lower = text.to_ascii_lowercase();
    let switch = switch.to_ascii_lowercase();
    let switch_start = lower.match_indices(&switch).map(|(idx, _)| idx).find(|&idx| {
        idx == 0 || text[..idx].ends_with(char::is_whitespace)
    })?;
    let value_start = switch_start + switch.len();
    let rest = &text[value_start..];

    let (raw, value_end, quoted, malformed) = if let Some(inner) = rest.strip_prefix('"') {
        match inner.find('"') {
            Some(close) => (&inner[..close], value_start + close + 2, true, false),
            None => (inner, text.len(), true, true),
        }
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        (&rest[..end], value_start + end, false, false)
    };

    if raw.is_empty() {
        return None;
    }

    let path = raw.replace(r"\\", r"\");
    let name = file_name(&path);
    let replacement = match (quoted, malformed) {
        (true, false) => format!("\"{}\"", name),
        (true, true) => format!("\"{}", name),
        (false, _) => name.to_string(),
    };
    let text = format!("{}{}{}", &text[..value_start], replacement, &text[value_end..]);

    Some(ShortenedSwitch {
        text,
        path,
        malformed,
    })
}

/// Re-join quote-aware tokens with single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    token_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect::<Vec<_>>()
        .join(" ")
}
