//! Job orchestration
//!
//! Runs the two research strategies concurrently for a job, merges and
//! synthesizes their output, and persists the terminal state. The job
//! record is written by this orchestrator alone, at well-defined
//! checkpoints: completion or error.

use super::engine::DeepResearchEngine;
use super::grounded::GroundedSearchEngine;
use super::merge::merge;
use super::prompts;
use super::synthesizer::{strip_sources_section, ReportSynthesizer};
use super::types::ResearchConfig;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::search::SearchSessionFactory;
use async_trait::async_trait;
use scout_core::{ResearchJob, ScoutError, ScoutResult};
use std::sync::Arc;
use tracing::{error, info};

/// Persistence boundary for job outcomes.
///
/// A job's status transitions exactly once, from running to complete or
/// error; implementations must reject a second terminal write.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Transition the job to Complete and write the finished report.
    async fn mark_complete(&self, id: &str, result: &str) -> ScoutResult<()>;

    /// Transition the job to Error, persisting a user-facing error report.
    async fn mark_error(&self, id: &str, result: &str) -> ScoutResult<()>;
}

/// Runs research jobs end to end.
pub struct JobOrchestrator {
    generator: Arc<dyn TextGenerator>,
    search_factory: Arc<dyn SearchSessionFactory>,
    store: Arc<dyn JobStore>,
    config: ResearchConfig,
}

impl JobOrchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search_factory: Arc<dyn SearchSessionFactory>,
        store: Arc<dyn JobStore>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            generator,
            search_factory,
            store,
            config,
        }
    }

    /// Run `job` to completion and persist the outcome.
    ///
    /// Any error escaping the pipeline is converted into a markdown error
    /// report and persisted with an Error status before this returns the
    /// original error to the caller for logging.
    pub async fn run(&self, job: &ResearchJob) -> ScoutResult<()> {
        info!(
            "Starting research job {} (breadth: {}, depth: {}, direct: {})",
            job.id, job.breadth, job.depth, job.direct_search
        );

        match self.execute(job).await {
            Ok(()) => {
                info!("Research job {} completed", job.id);
                Ok(())
            }
            Err(e) => {
                error!("Research job {} failed: {}", job.id, e);
                let report = error_report(&e);
                // The record must reflect the failure before the error
                // propagates to the caller.
                if let Err(store_err) = self.store.mark_error(&job.id, &report).await {
                    error!(
                        "Failed to persist error state for job {}: {}",
                        job.id, store_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, job: &ResearchJob) -> ScoutResult<()> {
        let prompt = combined_prompt(job);

        let report = if job.direct_search {
            self.run_direct(job, &prompt).await?
        } else {
            self.run_dual(job, &prompt).await?
        };

        self.store.mark_complete(&job.id, &report).await
    }

    /// The full dual-strategy flow: deep recursive research and grounded
    /// search run concurrently, then merge and synthesize.
    async fn run_dual(&self, job: &ResearchJob, prompt: &str) -> ScoutResult<String> {
        // One browser session per job, consumed only by the deep branch.
        let search = self.search_factory.acquire().await?;

        let engine =
            DeepResearchEngine::new(self.generator.clone(), search.clone(), self.config.clone());
        let grounded = GroundedSearchEngine::new(self.generator.clone(), self.config.clone());

        let (deep, wide) = tokio::join!(
            engine.research(
                prompt.to_string(),
                job.breadth,
                job.depth,
                Vec::new(),
                Vec::new(),
            ),
            grounded.search_with_grounding(prompt),
        );

        search.close().await;

        let deep = deep?;
        info!(
            "Strategies finished (deep: {} learnings, grounded: {} learnings)",
            deep.learnings.len(),
            wide.learnings.len()
        );

        let merged = merge(deep, wide);

        let synthesizer = ReportSynthesizer::new(self.generator.clone());
        synthesizer
            .synthesize(prompt, &merged.learnings, &merged.visited_urls)
            .await
    }

    /// The direct-search flow: one grounded call produces the report
    /// itself, then the sources section is rebuilt from the structured
    /// citation list rather than trusting the model's own text.
    async fn run_direct(&self, job: &ResearchJob, prompt: &str) -> ScoutResult<String> {
        let generation = self
            .generator
            .generate(GenerationRequest::grounded(
                prompts::direct_report_prompt(),
                format!("[WEB SEARCH REQUEST] {}", prompt),
            ))
            .await?;

        let mut report = strip_sources_section(&generation.text);
        report.push_str("\n\n## Sources\n\n");

        if generation.sources.is_empty() {
            report.push_str(
                "_Sources were gathered via live web search and could not be \
                 enumerated individually._\n\nSearch queries used:\n",
            );
            report.push_str(&format!("1. {}\n", job.query));
        } else {
            let mut seen = std::collections::HashSet::new();
            let mut index = 0;
            for source in &generation.sources {
                if seen.insert(source.url.clone()) {
                    index += 1;
                    report.push_str(&format!("{}. {}\n", index, source.url));
                }
            }
        }

        Ok(report)
    }
}

/// Build the research prompt from the original query and the clarification
/// Q&A gathered at submission time.
fn combined_prompt(job: &ResearchJob) -> String {
    let mut prompt = format!("Research topic: {}\n", job.query);

    if !job.questions.is_empty() {
        prompt.push_str("\nAdditional context from clarifying questions:\n");
        for qa in &job.questions {
            prompt.push_str(&format!("Q: {}\nA: {}\n", qa.question, qa.answer));
        }
    }

    prompt.trim().to_string()
}

/// Format an escaped error as a user-facing markdown report.
fn error_report(error: &ScoutError) -> String {
    format!(
        "## Error Generating Research Report\n\n\
         There was an error while researching your topic. Please try again \
         later, or try rephrasing the topic.\n\n\
         Error details: {error}\n\n\
         Suggested next steps:\n\
         - Re-submit the request to start a fresh job\n\
         - Narrow the topic if it is very broad\n\
         - Check the service configuration if the problem persists\n"
    )
}
