//! Search query planning
//!
//! Turns a research goal (and any prior learnings) into the next round of
//! web search queries.

use super::prompts;
use super::types::SerpQuery;
use crate::llm::{generate_object, TextGenerator};
use scout_core::ScoutResult;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct QueryPlan {
    #[serde(default)]
    queries: Vec<SerpQuery>,
}

/// Plans the search queries for one recursion level.
pub struct QueryPlanner {
    generator: Arc<dyn TextGenerator>,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate up to `max_queries` search queries for the given prompt.
    ///
    /// Prior learnings steer the model away from ground already covered.
    /// The result is truncated to `max_queries` even if the model returns
    /// more.
    pub async fn generate_queries(
        &self,
        research_prompt: &str,
        prior_learnings: &[String],
        max_queries: usize,
    ) -> ScoutResult<Vec<SerpQuery>> {
        if max_queries == 0 {
            return Ok(Vec::new());
        }

        let mut prompt = format!(
            "Given the following prompt from the user, generate a list of web search \
             queries to research the topic. Return a JSON object of this exact shape:\n\
             {{\"queries\": [{{\"query\": \"<search query>\", \"research_goal\": \"<what this \
             query should uncover and how to advance the research once answered>\"}}]}}\n\
             Return a maximum of {} queries, fewer if the topic is already clear. \
             Each query must be unique and not similar to the others.\n\n\
             <prompt>{}</prompt>",
            max_queries, research_prompt
        );

        if !prior_learnings.is_empty() {
            prompt.push_str(&format!(
                "\n\nHere are learnings from previous research; use them to generate \
                 more specific queries:\n{}",
                prior_learnings.join("\n")
            ));
        }

        let plan: QueryPlan =
            generate_object(self.generator.as_ref(), &prompts::research_assistant_prompt(), &prompt)
                .await?;

        let mut queries = plan.queries;
        queries.truncate(max_queries);

        debug!("Planned {} queries (max {})", queries.len(), max_queries);
        Ok(queries)
    }
}
