//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Candidate, CandidateBuilder, ProductPage};
use crate::sources::{CatalogSource, SourceError};
use crate::utils::product_url;

/// Base URL of the catalog the mock pretends to be
pub const MOCK_BASE_URL: &str = "https://catalog.test";

/// A mock source for testing that returns predefined responses.
#[derive(Debug, Default)]
pub struct MockSource {
    search_results: Mutex<Vec<Candidate>>,
    search_failure: Mutex<Option<u16>>,
    product_pages: Mutex<HashMap<String, ProductPage>>,
    last_search: Mutex<Option<(String, usize)>>,
    search_calls: AtomicUsize,
    product_page_calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw candidates every search returns.
    pub fn set_search_results(&self, candidates: Vec<Candidate>) {
        *self.search_results.lock().unwrap() = candidates;
    }

    /// Make every search fail with the given HTTP status.
    pub fn fail_search_with_status(&self, status: u16) {
        *self.search_failure.lock().unwrap() = Some(status);
    }

    /// Register the page returned for a product URL.
    pub fn set_product_page(&self, url: &str, page: ProductPage) {
        self.product_pages
            .lock()
            .unwrap()
            .insert(url.to_string(), page);
    }

    /// Title and `max_results` of the most recent search.
    pub fn last_search(&self) -> Option<(String, usize)> {
        self.last_search.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn product_page_calls(&self) -> usize {
        self.product_page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    fn name(&self) -> &str {
        "Mock Catalog"
    }

    async fn search(&self, title: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((title.to_string(), max_results));

        if let Some(status) = *self.search_failure.lock().unwrap() {
            return Err(SourceError::HttpStatus(status));
        }

        Ok(self.search_results.lock().unwrap().clone())
    }

    async fn product_page(&self, url: &str) -> ProductPage {
        self.product_page_calls.fetch_add(1, Ordering::SeqCst);
        self.product_pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(ProductPage::unresolved)
    }

    fn product_url(&self, identifier: &str) -> String {
        product_url(MOCK_BASE_URL, identifier)
    }
}

/// Helper function to create a mock candidate with a thumbnail.
pub fn make_candidate(identifier: &str, title: &str) -> Candidate {
    CandidateBuilder::new(identifier, product_url(MOCK_BASE_URL, identifier), title)
        .thumbnail_url(format!(
            "https://m.media-amazon.com/images/I/{}._SL500_.jpg",
            identifier
        ))
        .build()
}
