//! Core data models for candidates and lookup queries.

mod candidate;
mod lookup;

pub use candidate::{Candidate, CandidateBuilder, ProductPage, MAX_TITLE_CHARS, UNKNOWN_TITLE};
pub use lookup::{LookupQuery, LookupRequest, LookupResponse, DEFAULT_MAX_RESULTS};
