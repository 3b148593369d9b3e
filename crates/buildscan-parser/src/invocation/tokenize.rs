use std::ops::Range;

/// Byte ranges of whitespace-separated tokens; whitespace inside `"..."` does
/// not split. An unterminated quote runs to the end of the text.
pub fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;

    for (idx, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c.is_whitespace() && !in_quotes {
            if let Some(s) = start.take() {
                spans.push(s..idx);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

/// Quote-aware tokens, quotes preserved.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_spans(text).into_iter().map(|span| &text[span]).collect()
}

/// Drop surrounding quotes.
pub fn unquote(token: &str) -> &str {
    token.trim_matches('"')
}

/// Display form of each argument: quotes and a leading `@` removed.
pub fn arguments(text: &str) -> Vec<&str> {
    tokenize(text)
        .into_iter()
        .map(|token| unquote(unquote(token).trim_start_matches('@')))
        .filter(|token| !token.is_empty())
        .collect()
}
