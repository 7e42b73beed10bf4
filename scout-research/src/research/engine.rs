//! The recursive deep-research engine
//!
//! Each level plans search queries from the accumulated learnings, explores
//! one of them, distills new learnings, then recurses with half the breadth
//! and one less depth. Recursion stops when the depth budget is spent or
//! the planner produces no queries.

use super::planner::QueryPlanner;
use super::summarizer::Summarizer;
use super::types::{ResearchConfig, ResearchFindings, SummaryOutcome};
use crate::llm::TextGenerator;
use crate::search::SearchProvider;
use futures::future::BoxFuture;
use futures::FutureExt;
use scout_core::ScoutResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Recursive breadth/depth-bounded research over the web.
///
/// One engine is built per job and runs sequentially within its branch; it
/// is the sole consumer of the job's browser search session.
pub struct DeepResearchEngine {
    planner: QueryPlanner,
    summarizer: Summarizer,
    search: Arc<dyn SearchProvider>,
    config: ResearchConfig,
}

impl DeepResearchEngine {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn SearchProvider>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            planner: QueryPlanner::new(generator.clone()),
            summarizer: Summarizer::new(generator, config.summarizer_timeout_ms),
            search,
            config,
        }
    }

    /// Research `query` with the given budgets, accumulating onto the
    /// passed-in state.
    ///
    /// Invariants:
    /// - terminates within `depth` recursive calls (`depth` strictly
    ///   decreases; base case is `depth <= 1` after one level)
    /// - `learnings`/`visited_urls` only ever grow within the branch,
    ///   except on a search failure, which discards the branch entirely
    ///   and returns an empty result
    pub fn research(
        &self,
        query: String,
        breadth: usize,
        depth: usize,
        learnings: Vec<String>,
        visited_urls: Vec<String>,
    ) -> BoxFuture<'_, ScoutResult<ResearchFindings>> {
        async move {
            info!(
                "Research level starting (breadth: {}, depth: {}, {} learnings so far)",
                breadth,
                depth,
                learnings.len()
            );

            // Planner failures degrade to an empty plan for this branch
            // instead of aborting the job.
            let queries = match self
                .planner
                .generate_queries(&query, &learnings, breadth)
                .await
            {
                Ok(queries) => queries,
                Err(e) => {
                    warn!("Query planning failed, ending branch: {}", e);
                    Vec::new()
                }
            };

            // Only the first planned query is explored per level; breadth
            // shapes planning diversity and the follow-up cap, not parallel
            // exploration.
            let Some(serp) = queries.into_iter().next() else {
                return Ok(ResearchFindings::new(learnings, visited_urls));
            };

            info!("Exploring query: {} ({})", serp.query, serp.research_goal);

            // A search failure drops everything this branch accumulated.
            let results = match self
                .search
                .search(&serp.query, self.config.search_limit)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    warn!("Search failed, discarding branch: {}", e);
                    return Ok(ResearchFindings::default());
                }
            };

            let max_followups = breadth.div_ceil(2);
            let summary = match self
                .summarizer
                .extract_learnings(
                    &serp.query,
                    &results,
                    self.config.max_learnings_per_level,
                    max_followups,
                )
                .await
            {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Summarization failed, continuing with zero learnings: {}", e);
                    SummaryOutcome::default()
                }
            };

            let SummaryOutcome {
                learnings: new_learnings,
                follow_up_questions,
            } = summary;

            let mut all_learnings = learnings;
            all_learnings.extend(new_learnings);
            let mut all_urls = visited_urls;
            all_urls.extend(results.iter().map(|r| r.url.clone()));

            let new_breadth = breadth.div_ceil(2);
            let new_depth = depth.saturating_sub(1);

            if new_depth > 0 {
                info!(
                    "Researching deeper (breadth: {}, depth: {})",
                    new_breadth, new_depth
                );
                let next_query = format!(
                    "Previous research goal: {}\nFollow-up research directions: {}",
                    serp.research_goal,
                    follow_up_questions.join("\n")
                );
                self.research(next_query, new_breadth, new_depth, all_learnings, all_urls)
                    .await
            } else {
                Ok(ResearchFindings::new(all_learnings, all_urls))
            }
        }
        .boxed()
    }
}
