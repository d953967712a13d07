//! Lookup orchestration.
//!
//! [`ThumbnailResolver`] decides how a [`LookupQuery`] is resolved and drives
//! the catalog source and the aggregator:
//!
//! 1. A product link resolves through the product page of its identifier, or
//!    through the link itself when no identifier can be read from it.
//! 2. An ISBN is turned into an identifier candidate and resolved through its
//!    product page. When no candidate can be derived, the catalog is not asked.
//! 3. A title runs a book-category search, then deduplicates and limits.
//!
//! The resolver holds no per-lookup state and can be shared across tasks.

mod service;

pub use service::{resolve_thumbnails, LookupError};

use std::sync::Arc;

use crate::config::Config;
use crate::models::{Candidate, CandidateBuilder, LookupQuery};
use crate::sources::{AmazonSource, CatalogSource, SourceError};
use crate::utils::{
    dedupe_and_limit, extract_identifier, isbn_to_identifier_candidate, rank_by_relevance,
};

/// Resolves lookup queries against a catalog source
#[derive(Debug, Clone)]
pub struct ThumbnailResolver {
    source: Arc<dyn CatalogSource>,
}

impl ThumbnailResolver {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Resolver backed by the Amazon catalog described in `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(Arc::new(AmazonSource::from_config(config)?)))
    }

    /// All candidates for a query, in catalog order unless `rank` is set
    ///
    /// Link and ISBN queries yield at most one candidate. An empty list is a
    /// valid outcome; only a fatal search failure or an unusable query is an
    /// error.
    pub async fn candidates(
        &self,
        query: &LookupQuery,
        rank: bool,
    ) -> Result<Vec<Candidate>, LookupError> {
        match query {
            LookupQuery::ProductLink { url } => {
                Ok(self.resolve_link(url).await.into_iter().collect())
            }
            LookupQuery::Isbn { code } => Ok(self.resolve_isbn(code).await.into_iter().collect()),
            LookupQuery::Title { text, max_results } => {
                self.search_title(text, *max_results, rank).await
            }
        }
    }

    /// Thumbnail of the single best match
    ///
    /// Title queries only need one result, so they search with a limit of one.
    pub async fn thumbnail(&self, query: &LookupQuery) -> Result<Option<String>, LookupError> {
        let query = match query {
            LookupQuery::Title { text, .. } => LookupQuery::title(text.clone(), 1),
            other => other.clone(),
        };

        let candidates = self.candidates(&query, false).await?;
        Ok(candidates.into_iter().next().and_then(|c| c.thumbnail_url))
    }

    async fn search_title(
        &self,
        title: &str,
        max_results: usize,
        rank: bool,
    ) -> Result<Vec<Candidate>, LookupError> {
        if max_results == 0 {
            return Err(LookupError::Validation(
                "max_results must be at least 1".to_string(),
            ));
        }

        let raw = self.source.search(title, max_results).await?;
        let raw_count = raw.len();

        let candidates = if rank {
            let mut ranked = rank_by_relevance(dedupe_and_limit(raw, usize::MAX), title);
            ranked.truncate(max_results);
            ranked
        } else {
            dedupe_and_limit(raw, max_results)
        };

        tracing::info!(
            "{} title '{}': {} raw candidates, {} returned",
            self.source.name(),
            title,
            raw_count,
            candidates.len()
        );
        Ok(candidates)
    }

    async fn resolve_isbn(&self, code: &str) -> Option<Candidate> {
        let Some(identifier) = isbn_to_identifier_candidate(code) else {
            tracing::info!("ISBN '{}' has no identifier candidate", code);
            return None;
        };

        tracing::debug!("ISBN '{}' -> identifier candidate {}", code, identifier);
        self.resolve_identifier(&identifier).await
    }

    async fn resolve_link(&self, url: &str) -> Option<Candidate> {
        match extract_identifier(url) {
            Some(identifier) => self.resolve_identifier(&identifier).await,
            None => {
                tracing::debug!("No identifier in '{}', reading the link directly", url);
                let page = self.source.product_page(url).await;
                let thumbnail_url = page.thumbnail_url?;
                Some(
                    CandidateBuilder::new(String::new(), url, page.title)
                        .thumbnail_url(thumbnail_url)
                        .build(),
                )
            }
        }
    }

    async fn resolve_identifier(&self, identifier: &str) -> Option<Candidate> {
        let link = self.source.product_url(identifier);
        let page = self.source.product_page(&link).await;

        let Some(thumbnail_url) = page.thumbnail_url else {
            tracing::warn!("No thumbnail found for {}", link);
            return None;
        };

        Some(
            CandidateBuilder::new(identifier, link, page.title)
                .thumbnail_url(thumbnail_url)
                .build(),
        )
    }
}
