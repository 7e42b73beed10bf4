//! Merging results from the two research strategies
//!
//! Set-union semantics: concatenate, then deduplicate by exact string
//! equality preserving first-seen order. No fuzzy or semantic matching.

use super::types::ResearchFindings;
use std::collections::HashSet;

/// Merge two research results into one deduplicated set of learnings and
/// visited URLs.
pub fn merge(a: ResearchFindings, b: ResearchFindings) -> ResearchFindings {
    ResearchFindings {
        learnings: dedup_preserving_order(a.learnings.into_iter().chain(b.learnings)),
        visited_urls: dedup_preserving_order(a.visited_urls.into_iter().chain(b.visited_urls)),
    }
}

fn dedup_preserving_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
