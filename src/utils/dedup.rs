//! Deduplication and optional relevance ordering for candidates.
//!
//! The catalog's own result order is authoritative: [`dedupe_and_limit`]
//! never reorders. [`rank_by_relevance`] exists for callers that explicitly
//! want results reordered by similarity to their query.

use std::collections::HashSet;

use crate::models::Candidate;

/// Drop repeated identifiers and thumbnail-less entries, keep order, cap at `max_results`
///
/// The first occurrence of an identifier wins.
pub fn dedupe_and_limit(candidates: Vec<Candidate>, max_results: usize) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();

    candidates
        .into_iter()
        .filter(|c| seen.insert(c.identifier.clone()))
        .filter(|c| {
            if !c.has_thumbnail() {
                tracing::warn!("No thumbnail found for {}", c.link);
            }
            c.has_thumbnail()
        })
        .take(max_results)
        .collect()
}

/// Score a title against the query text, higher is closer
///
/// Exact match +1000, prefix +500, substring +200, +50 per query word found,
/// +10 for titles between 10 and 100 characters. Comparison ignores case.
pub fn relevance_score(title: &str, query: &str) -> u32 {
    let title = title.to_lowercase();
    let query = query.to_lowercase();
    let mut score = 0;

    if title == query {
        score += 1000;
    }
    if title.starts_with(&query) {
        score += 500;
    }
    if title.contains(&query) {
        score += 200;
    }
    for word in query.split_whitespace() {
        if title.contains(word) {
            score += 50;
        }
    }

    let len = title.chars().count();
    if (10..=100).contains(&len) {
        score += 10;
    }

    score
}

/// Reorder candidates by [`relevance_score`], keeping catalog order among ties
pub fn rank_by_relevance(candidates: Vec<Candidate>, query: &str) -> Vec<Candidate> {
    let mut scored: Vec<(u32, Candidate)> = candidates
        .into_iter()
        .map(|c| (relevance_score(&c.title, query), c))
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, c)| c).collect()
}
