//! Learning extraction from search results
//!
//! One structured-generation call per batch of fetched pages, distilling
//! them into atomic learnings plus follow-up questions for the next
//! recursion level.

use super::prompts;
use super::types::SummaryOutcome;
use crate::llm::{generate_object, TextGenerator};
use crate::search::SearchRecord;
use scout_core::{with_timeout, ScoutResult};
use std::sync::Arc;
use tracing::debug;

/// Distills page texts into bounded learnings and follow-up questions.
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    timeout_ms: u64,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout_ms: u64) -> Self {
        Self {
            generator,
            timeout_ms,
        }
    }

    /// Extract up to `max_learnings` learnings and `max_followups` follow-up
    /// questions from the pages a query produced.
    ///
    /// Empty page texts are filtered out before the call. The call is still
    /// issued when every page filtered out, degrading to the model's general
    /// knowledge of the query. A timeout counts as a generation failure for
    /// this branch, not a whole-job abort.
    pub async fn extract_learnings(
        &self,
        query: &str,
        pages: &[SearchRecord],
        max_learnings: usize,
        max_followups: usize,
    ) -> ScoutResult<SummaryOutcome> {
        let contents: Vec<&str> = pages
            .iter()
            .map(|page| page.markdown.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect();

        debug!(
            "Summarizing {} pages ({} non-empty) for query: {}",
            pages.len(),
            contents.len(),
            query
        );

        let formatted_contents = contents
            .iter()
            .map(|text| format!("<content>\n{}\n</content>", text))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Given the following contents from a web search for the query \
             <query>{}</query>, generate a list of learnings from the contents. \
             Return a JSON object of this exact shape:\n\
             {{\"learnings\": [\"<learning>\"], \"follow_up_questions\": [\"<question>\"]}}\n\
             Return a maximum of {} learnings and {} follow-up questions, fewer if the \
             contents are clear. Each learning must be unique, concise, and as \
             information-dense as possible: include exact metrics, numbers, dates, and \
             entity names mentioned in the contents. The follow-up questions should \
             point at what to research next.\n\n\
             <contents>\n{}\n</contents>",
            query, max_learnings, max_followups, formatted_contents
        );

        let outcome = with_timeout(
            generate_object::<SummaryOutcome>(
                self.generator.as_ref(),
                &prompts::research_assistant_prompt(),
                &prompt,
            ),
            self.timeout_ms,
            "extract_learnings",
        )
        .await??;

        let mut outcome = outcome;
        outcome.learnings.truncate(max_learnings);
        outcome.follow_up_questions.truncate(max_followups);

        debug!(
            "Extracted {} learnings and {} follow-up questions",
            outcome.learnings.len(),
            outcome.follow_up_questions.len()
        );
        Ok(outcome)
    }
}
