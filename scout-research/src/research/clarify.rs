//! Clarifying-question generation
//!
//! Before a job is created, the user answers a short round of questions
//! that narrow the research direction. One structured call, capped count.

use super::prompts;
use crate::llm::{generate_object, TextGenerator};
use scout_core::ScoutResult;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ClarifyingQuestions {
    #[serde(default)]
    questions: Vec<String>,
}

/// Generates clarifying questions for a research topic.
pub struct Clarifier {
    generator: Arc<dyn TextGenerator>,
    max_questions: usize,
}

impl Clarifier {
    pub fn new(generator: Arc<dyn TextGenerator>, max_questions: usize) -> Self {
        Self {
            generator,
            max_questions,
        }
    }

    /// Ask the model for up to `max_questions` clarifying questions,
    /// truncating whatever it returns to the cap.
    pub async fn clarify(&self, topic: &str) -> ScoutResult<Vec<String>> {
        let prompt = format!(
            "Given the following research topic, generate follow-up questions that \
             would clarify the research direction. Return a JSON object of this \
             exact shape:\n{{\"questions\": [\"<question>\"]}}\n\
             Return a maximum of {} questions.\n\n<topic>{}</topic>",
            self.max_questions, topic
        );

        let mut result: ClarifyingQuestions = generate_object(
            self.generator.as_ref(),
            &prompts::clarifying_questions_prompt(),
            &prompt,
        )
        .await?;

        result.questions.truncate(self.max_questions);
        debug!(
            "Generated {} clarifying questions for topic: {}",
            result.questions.len(),
            topic
        );
        Ok(result.questions)
    }
}
