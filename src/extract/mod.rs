//! Candidate extraction from catalog markup.
//!
//! The catalog's markup has no stable contract, so every field is recovered
//! through an ordered chain of strategies, each a plain function tried until
//! one produces a value:
//!
//! - [`search`]: DOM-based extraction of result cards (the default)
//! - [`fallback`]: regex scan of detail-page links, for when DOM extraction is
//!   switched off or stops matching
//! - [`product`]: title and cover image of a single product page
//!
//! Parsing is synchronous and returns plain data, so no DOM handle is held
//! across an await. Backfilling from product pages happens afterwards through
//! a [`CatalogSource`].

pub mod fallback;
pub mod product;
pub mod search;
pub mod selectors;
pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Candidate;
use crate::sources::CatalogSource;

/// How a search results page is turned into candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Parse result cards with CSS selectors
    #[default]
    Structured,
    /// Scan raw markup for detail-page links
    Regex,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Structured => write!(f, "structured"),
            ExtractionMode::Regex => write!(f, "regex"),
        }
    }
}

/// Extract up to `max_results * overfetch` candidates from a results page
///
/// Candidates come back in page order and may repeat identifiers.
pub async fn extract_candidates(
    source: &dyn CatalogSource,
    html: &str,
    mode: ExtractionMode,
    max_results: usize,
    overfetch: usize,
) -> Vec<Candidate> {
    let limit = max_results.saturating_mul(overfetch.max(1));

    let candidates = match mode {
        ExtractionMode::Structured => search::collect_candidates(source, html, limit).await,
        ExtractionMode::Regex => {
            let max_links = max_results.saturating_mul(fallback::LINK_SCAN_FACTOR);
            fallback::collect_candidates(source, html, max_links, limit).await
        }
    };

    tracing::info!(
        "Extracted {} candidates ({} mode, limit {})",
        candidates.len(),
        mode,
        limit
    );
    candidates
}
