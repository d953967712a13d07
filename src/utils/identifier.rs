//! Conversions between product links, catalog identifiers, and ISBNs.
//!
//! Everything here is pure: no I/O, and "no match" is always `None`.

use regex::Regex;
use std::sync::LazyLock;

/// Detail-page path shapes that carry an identifier
static IDENTIFIER_IN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:dp|gp/product|exec/obidos/ASIN)/([A-Z0-9]{10})").unwrap()
});

/// Extract the 10-character identifier from a product detail link
///
/// Recognises `/dp/{id}`, `/gp/product/{id}` and `/exec/obidos/ASIN/{id}`.
pub fn extract_identifier(link: &str) -> Option<String> {
    IDENTIFIER_IN_LINK
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Derive a best-effort identifier candidate from an ISBN
///
/// Hyphens and spaces are stripped first. A 13-character code starting with
/// `978` or `979` yields its characters 4 to 12 (nine characters); a
/// 10-character code is returned unchanged; anything else yields `None`.
///
/// The 13-digit branch does not compute the ISBN-10 check digit, so its output
/// is a guess at the identifier body, not a verified catalog identifier.
pub fn isbn_to_identifier_candidate(isbn: &str) -> Option<String> {
    let cleaned: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();

    match cleaned.len() {
        13 => {
            let prefix: String = cleaned[..3].iter().collect();
            if prefix == "978" || prefix == "979" {
                Some(cleaned[3..12].iter().collect())
            } else {
                None
            }
        }
        10 => Some(cleaned.into_iter().collect()),
        _ => None,
    }
}

/// Build the product detail URL for an identifier
pub fn product_url(base_url: &str, identifier: &str) -> String {
    format!("{}/dp/{}", base_url.trim_end_matches('/'), identifier)
}
