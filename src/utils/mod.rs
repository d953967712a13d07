//! Utility modules supporting lookups.
//!
//! This module provides utility functions and types used throughout the library:
//!
//! - [`dedupe_and_limit`]: Remove repeated identifiers while keeping catalog order
//! - [`rank_by_relevance`]: Optional reordering by similarity to the query
//! - [`HttpClient`]: HTTP client with browser headers and a cookie session
//! - [`FetchRequest`] / [`FetchOutcome`]: One catalog GET and what it produced
//! - [`RetryConfig`]: Configuration for retry logic with exponential backoff
//! - [`extract_identifier`] / [`isbn_to_identifier_candidate`]: Identifier codec
//!
//! # Deduplication
//!
//! ```rust
//! use cover_finder::utils::dedupe_and_limit;
//! use cover_finder::models::Candidate;
//!
//! # fn example(candidates: Vec<Candidate>) {
//! // First occurrence of each identifier wins, order is kept
//! let unique = dedupe_and_limit(candidates, 5);
//! # }
//! ```
//!
//! # Fetching with Backoff
//!
//! ```rust,no_run
//! use cover_finder::utils::{FetchRequest, HttpClient, RetryConfig};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let request = FetchRequest::new("https://www.amazon.co.jp/s", Duration::from_secs(30))
//!     .param("k", "リーダブルコード");
//! let outcome = client.fetch(&request, RetryConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

mod dedup;
mod http;
mod identifier;
mod retry;

pub use dedup::{dedupe_and_limit, rank_by_relevance, relevance_score};
pub use http::{FetchOutcome, FetchRequest, HttpClient};
pub use identifier::{extract_identifier, isbn_to_identifier_candidate, product_url};
pub use retry::{with_retry_detailed, RetryConfig, RetryResult, RetryState, TransientError};
