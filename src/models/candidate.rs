//! Candidate model representing one catalog entry with a cover thumbnail.

use serde::{Deserialize, Serialize};

use crate::extract::text::truncate_chars;

/// Maximum number of characters kept from any extracted title
pub const MAX_TITLE_CHARS: usize = 200;

/// Title used when no strategy could recover one
pub const UNKNOWN_TITLE: &str = "unknown";

/// A catalog entry extracted from a search or product page
///
/// Candidates are created fresh for every lookup and never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Catalog identifier (10-character token for search results)
    pub identifier: String,

    /// Product detail page URL
    pub link: String,

    /// Trimmed, entity-decoded title, at most 200 characters
    pub title: String,

    /// Cover thumbnail URL, when one was found
    pub thumbnail_url: Option<String>,
}

impl Candidate {
    /// Create a new candidate with required fields
    pub fn new(identifier: String, link: String, title: String) -> Self {
        Self {
            identifier,
            link,
            title: truncate_chars(title.trim(), MAX_TITLE_CHARS),
            thumbnail_url: None,
        }
    }

    /// Check if a thumbnail was resolved
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_url.is_some()
    }

    /// Check if the title is the sentinel for an unresolved title
    pub fn has_unknown_title(&self) -> bool {
        self.title == UNKNOWN_TITLE
    }
}

/// Builder for constructing Candidate objects
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    candidate: Candidate,
}

impl CandidateBuilder {
    /// Create a new builder with required fields
    pub fn new(
        identifier: impl Into<String>,
        link: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            candidate: Candidate::new(identifier.into(), link.into(), title.into()),
        }
    }

    /// Set the thumbnail URL
    pub fn thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.candidate.thumbnail_url = Some(url.into());
        self
    }

    /// Build the Candidate
    pub fn build(self) -> Candidate {
        self.candidate
    }
}

/// What a single product detail page yields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    /// Product title, or [`UNKNOWN_TITLE`]
    pub title: String,

    /// Cover image URL
    pub thumbnail_url: Option<String>,
}

impl ProductPage {
    /// A page that produced nothing usable
    pub fn unresolved() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            thumbnail_url: None,
        }
    }
}
