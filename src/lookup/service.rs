//! The boundary operation exposed to front ends.

use crate::lookup::ThumbnailResolver;
use crate::models::{LookupRequest, LookupResponse};
use crate::sources::SourceError;

/// Structured lookup failures
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No usable input, or an invalid parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// The lookup ran but found no candidate with a thumbnail
    #[error("No thumbnail found")]
    NotFound,

    /// The catalog failed the search outright
    #[error("Upstream error: {0}")]
    Upstream(#[from] SourceError),
}

impl LookupError {
    /// HTTP status a front end should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::Validation(_) => 400,
            LookupError::NotFound => 404,
            LookupError::Upstream(_) => 502,
        }
    }
}

/// Resolve a boundary request into a candidate list
///
/// Input priority is link, then ISBN, then title. An empty outcome is
/// reported as [`LookupError::NotFound`].
pub async fn resolve_thumbnails(
    resolver: &ThumbnailResolver,
    request: LookupRequest,
) -> Result<LookupResponse, LookupError> {
    let query = request.query().ok_or_else(|| {
        LookupError::Validation("one of title, isbn or url is required".to_string())
    })?;

    tracing::info!("Resolving {} lookup", query.kind());
    let candidates = resolver.candidates(&query, request.rank).await?;

    if candidates.is_empty() {
        tracing::info!("No candidates for {} lookup", query.kind());
        return Err(LookupError::NotFound);
    }

    Ok(LookupResponse::new(candidates))
}
