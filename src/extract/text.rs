//! Text normalization shared by every title strategy.

use std::borrow::Cow;

use crate::models::MAX_TITLE_CHARS;

/// Keep at most `max` characters (not bytes)
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Replace every run of whitespace with a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode entities, collapse whitespace, and truncate a raw markup title
pub fn clean_title(raw: &str) -> String {
    let decoded: Cow<'_, str> = html_escape::decode_html_entities(raw);
    truncate_chars(&collapse_whitespace(&decoded), MAX_TITLE_CHARS)
}

/// Join non-empty trimmed fragments with single spaces
pub fn join_fragments<'a, I>(fragments: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let parts: Vec<&str> = fragments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Character count, which is what every length rule here is measured in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
