//! # Cover Finder
//!
//! Resolves book cover thumbnail URLs by title, ISBN, or product link, by
//! querying a catalog search page and extracting entries from its HTML.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Candidate, LookupQuery, etc.)
//! - [`sources`]: Catalog sources behind the [`CatalogSource`] trait
//! - [`extract`]: Strategy chains that pull candidates out of search and product pages
//! - [`lookup`]: The resolver facade and the boundary request/response types
//! - [`mcp`]: MCP protocol implementation and server
//! - [`utils`]: HTTP client, retry, identifier codec, and deduplication
//! - [`config`]: Configuration management

pub mod config;
pub mod extract;
pub mod lookup;
pub mod mcp;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use lookup::{resolve_thumbnails, LookupError, ThumbnailResolver};
pub use models::{Candidate, LookupQuery};
pub use sources::{CatalogSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
