//! Catalog sources.
//!
//! A [`CatalogSource`] answers the two questions a lookup needs: "which
//! listings does a title search return" and "what does one product page say".
//! [`AmazonSource`] talks to the real catalog; [`MockSource`] returns preset
//! data for tests.

mod amazon;
pub mod mock;

pub use amazon::AmazonSource;
pub use mock::MockSource;

use async_trait::async_trait;

use crate::models::{Candidate, ProductPage};

/// A catalog that can be searched for book listings
#[async_trait]
pub trait CatalogSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search the book category for `title`.
    ///
    /// Returns raw candidates in catalog order, over-fetched relative to
    /// `max_results` so that deduplication still leaves enough. The list may
    /// contain repeated identifiers. A throttled search yields an empty list.
    async fn search(&self, title: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError>;

    /// Fetch and parse one product detail page.
    ///
    /// Never fails: network and parse problems are logged and produce
    /// [`ProductPage::unresolved`].
    async fn product_page(&self, url: &str) -> ProductPage;

    /// Detail page URL for an identifier
    fn product_url(&self, identifier: &str) -> String;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered 503
    #[error("Service unavailable (503)")]
    ServiceUnavailable,

    /// Upstream answered with a non-success status other than 503
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Parsing error (HTML, body decoding)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}
