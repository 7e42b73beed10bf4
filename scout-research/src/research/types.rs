//! Types for the deep research system

use serde::{Deserialize, Serialize};

/// Tunables for a research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Number of search results fetched per query.
    pub search_limit: usize,
    /// Maximum learnings distilled per recursion level.
    pub max_learnings_per_level: usize,
    /// Minimum number of prefixed learnings expected from a grounded call
    /// before the bullet-list fallback parse is attempted.
    pub min_grounded_learnings: usize,
    /// Timeout for one summarization call.
    pub summarizer_timeout_ms: u64,
    /// Maximum clarifying questions generated for a topic.
    pub max_clarifying_questions: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            search_limit: 5,
            max_learnings_per_level: 3,
            min_grounded_learnings: 5,
            summarizer_timeout_ms: 60_000,
            max_clarifying_questions: 5,
        }
    }
}

/// A generated search query paired with the goal it is meant to advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpQuery {
    pub query: String,
    pub research_goal: String,
}

/// Accumulated research state for one branch.
///
/// Both sequences grow monotonically within a branch and are owned
/// exclusively by it; deduplication happens only at the final merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchFindings {
    pub learnings: Vec<String>,
    pub visited_urls: Vec<String>,
}

impl ResearchFindings {
    pub fn new(learnings: Vec<String>, visited_urls: Vec<String>) -> Self {
        Self {
            learnings,
            visited_urls,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.learnings.is_empty() && self.visited_urls.is_empty()
    }
}

/// Output of one summarization call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryOutcome {
    #[serde(default)]
    pub learnings: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}
