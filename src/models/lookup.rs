//! Lookup request and response models.

use serde::{Deserialize, Serialize};

use super::Candidate;

/// Number of candidates returned for a title lookup when none is requested
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// What the caller is looking up
///
/// Resolution priority is fixed: `ProductLink` > `Isbn` > `Title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupQuery {
    /// Free-text title search returning up to `max_results` candidates
    Title { text: String, max_results: usize },
    /// ISBN-10 or ISBN-13, hyphens and spaces allowed
    Isbn { code: String },
    /// A product detail link
    ProductLink { url: String },
}

impl LookupQuery {
    /// Create a title query
    pub fn title(text: impl Into<String>, max_results: usize) -> Self {
        LookupQuery::Title {
            text: text.into(),
            max_results,
        }
    }

    /// Create an ISBN query
    pub fn isbn(code: impl Into<String>) -> Self {
        LookupQuery::Isbn { code: code.into() }
    }

    /// Create a product link query
    pub fn product_link(url: impl Into<String>) -> Self {
        LookupQuery::ProductLink { url: url.into() }
    }

    /// Short label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            LookupQuery::Title { .. } => "title",
            LookupQuery::Isbn { .. } => "isbn",
            LookupQuery::ProductLink { .. } => "link",
        }
    }
}

/// Boundary request with every input optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Book title
    #[serde(default)]
    pub title: Option<String>,

    /// ISBN (10 or 13 digits)
    #[serde(default)]
    pub isbn: Option<String>,

    /// Product detail page URL
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of candidates for a title search
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Reorder title results by similarity to the query
    #[serde(default)]
    pub rank: bool,
}

impl LookupRequest {
    /// Create a request for a title
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Create a request for an ISBN
    pub fn by_isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn: Some(isbn.into()),
            ..Default::default()
        }
    }

    /// Create a request for a product link
    pub fn by_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Enable relevance ranking
    pub fn rank(mut self, rank: bool) -> Self {
        self.rank = rank;
        self
    }

    /// Pick the query to run, honouring link > isbn > title. Blank inputs count as absent.
    pub fn query(&self) -> Option<LookupQuery> {
        if let Some(url) = non_blank(&self.url) {
            return Some(LookupQuery::product_link(url));
        }
        if let Some(isbn) = non_blank(&self.isbn) {
            return Some(LookupQuery::isbn(isbn));
        }
        non_blank(&self.title).map(|title| {
            LookupQuery::title(title, self.max_results.unwrap_or(DEFAULT_MAX_RESULTS))
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Boundary response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupResponse {
    pub candidates: Vec<Candidate>,
}

impl LookupResponse {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Thumbnail of the first candidate
    pub fn best_thumbnail(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.thumbnail_url.as_deref())
    }
}
