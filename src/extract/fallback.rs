//! Regex extraction for results pages, no DOM required.
//!
//! Detail-page links are scanned straight out of the markup. Each link's
//! title is looked for near its `data-asin` marker, and both the cover image
//! and any missing title come from the product page.

use std::collections::HashSet;

use crate::extract::selectors::fallback;
use crate::extract::text::{char_len, clean_title};
use crate::models::{Candidate, CandidateBuilder};
use crate::sources::CatalogSource;
use crate::utils::extract_identifier;

/// Links scanned per requested result
pub const LINK_SCAN_FACTOR: usize = 4;

/// Bytes searched before and after a result's identifier marker
const CONTEXT_BEFORE: usize = 500;
const CONTEXT_AFTER: usize = 2000;

/// Identifiers of the first `max_links` detail-page links, in page order
///
/// Repeats are kept; the caller decides what to do with them.
pub fn scan_product_links(html: &str, max_links: usize) -> Vec<String> {
    fallback::PRODUCT_LINK
        .captures_iter(html)
        .take(max_links)
        .filter_map(|caps| caps.get(1).and_then(|m| extract_identifier(m.as_str())))
        .collect()
}

/// Title found in the markup surrounding `data-asin="{identifier}"`
pub fn title_near_marker(html: &str, identifier: &str) -> Option<String> {
    let marker = format!("data-asin=\"{}\"", identifier);
    let pos = html.find(&marker)?;

    let start = floor_boundary(html, pos.saturating_sub(CONTEXT_BEFORE));
    let end = ceil_boundary(html, pos.saturating_add(CONTEXT_AFTER));
    let context = &html[start..end];

    fallback::TITLE_PATTERNS.iter().find_map(|pattern| {
        let raw = pattern.captures(context)?.get(1)?.as_str();
        let title = clean_title(raw);
        is_meaningful(&title).then_some(title)
    })
}

fn is_meaningful(title: &str) -> bool {
    let lower = title.to_lowercase();
    char_len(title) > 3 && !fallback::PLACEHOLDER_TITLES.contains(&lower.as_str())
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Turn a results page into candidates via product pages
///
/// Each distinct identifier among the first `max_links` links costs one
/// product page fetch. Stops once `limit` candidates with a thumbnail are
/// collected.
pub async fn collect_candidates(
    source: &dyn CatalogSource,
    html: &str,
    max_links: usize,
    limit: usize,
) -> Vec<Candidate> {
    let identifiers = scan_product_links(html, max_links);
    tracing::info!("Found {} product links", identifiers.len());

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for identifier in identifiers {
        if candidates.len() >= limit {
            break;
        }
        if !seen.insert(identifier.clone()) {
            continue;
        }

        let link = source.product_url(&identifier);
        let nearby_title = title_near_marker(html, &identifier);
        let page = source.product_page(&link).await;

        let Some(thumbnail_url) = page.thumbnail_url else {
            tracing::warn!("No thumbnail found for {}", link);
            continue;
        };

        let title = nearby_title.unwrap_or(page.title);
        let candidate = CandidateBuilder::new(identifier, link, title)
            .thumbnail_url(thumbnail_url)
            .build();
        if candidate.has_unknown_title() {
            tracing::debug!("No title found for {}, keeping the thumbnail", candidate.link);
        }
        candidates.push(candidate);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductPage, UNKNOWN_TITLE};
    use crate::sources::MockSource;

    #[test]
    fn test_scan_product_links() {
        let html = r#"
            <a href="/dp/4873115655">one</a>
            <a href="/gp/product/B0ABCDEFGH">two</a>
            <a href="/dp/4873115655">one again</a>
            <a href="/help/contact">help</a>
            <a href="/dp/4798161911">three</a>"#;

        assert_eq!(
            scan_product_links(html, 10),
            vec!["4873115655", "B0ABCDEFGH", "4873115655", "4798161911"]
        );
        assert_eq!(scan_product_links(html, 2), vec!["4873115655", "B0ABCDEFGH"]);
    }

    #[test]
    fn test_title_near_marker() {
        let html = r#"
            <div data-asin="4873115655" data-component-type="s-search-result">
              <h2 class="a-size-mini"><a class="a-link-normal" href="/dp/4873115655">
                <span class="a-size-medium">リーダブルコード &amp; 実践</span>
              </a></h2>
            </div>"#;

        assert_eq!(
            title_near_marker(html, "4873115655").as_deref(),
            Some("リーダブルコード & 実践")
        );
        assert!(title_near_marker(html, "B0ABCDEFGH").is_none());
    }

    #[test]
    fn test_title_near_marker_rejects_placeholders() {
        let html = r#"<div data-asin="B0ABCDEFGH"><span class="a-text-normal">Title</span></div>"#;
        assert!(title_near_marker(html, "B0ABCDEFGH").is_none());
    }

    #[test]
    fn test_context_window_is_char_safe() {
        let padding = "あ".repeat(400);
        let html = format!(
            r#"{}<div data-asin="B0ABCDEFGH"><span>A long enough span title</span></div>{}"#,
            padding, padding
        );
        assert_eq!(
            title_near_marker(&html, "B0ABCDEFGH").as_deref(),
            Some("A long enough span title")
        );
    }

    #[tokio::test]
    async fn test_collect_uses_product_pages() {
        let source = MockSource::new();
        source.set_product_page(
            &source.product_url("4873115655"),
            ProductPage {
                title: "Page Title One".to_string(),
                thumbnail_url: Some(
                    "https://m.media-amazon.com/images/I/one._SL500_.jpg".to_string(),
                ),
            },
        );
        source.set_product_page(
            &source.product_url("4798161911"),
            ProductPage {
                title: "Only OG Title".to_string(),
                thumbnail_url: Some(
                    "https://m.media-amazon.com/images/I/two._SL500_.jpg".to_string(),
                ),
            },
        );

        let html = r#"
            <div data-asin="4873115655"><h2><a href="/dp/4873115655"><span>Nearby Title One</span></a></h2></div>
            <a href="/dp/4873115655">dup</a>
            <a href="/dp/B0NOTHUMBS">missing</a>
            <a href="/dp/4798161911">bare link</a>"#;

        let candidates = collect_candidates(&source, html, 20, 10).await;
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Nearby Title One");
        assert_eq!(candidates[1].identifier, "4798161911");
        assert_eq!(candidates[1].title, "Only OG Title");
        assert!(!candidates[1].has_unknown_title());

        // the duplicate link is not fetched twice
        assert_eq!(source.product_page_calls(), 3);
    }

    #[tokio::test]
    async fn test_collect_keeps_unknown_title() {
        let source = MockSource::new();
        source.set_product_page(
            &source.product_url("B0UNKNOWN0"),
            ProductPage {
                title: UNKNOWN_TITLE.to_string(),
                thumbnail_url: Some(
                    "https://m.media-amazon.com/images/I/x._SL500_.jpg".to_string(),
                ),
            },
        );

        let candidates =
            collect_candidates(&source, r#"<a href="/dp/B0UNKNOWN0">x</a>"#, 4, 3).await;
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].has_unknown_title());
    }
}
