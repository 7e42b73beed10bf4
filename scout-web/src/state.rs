//! Application state wiring
//!
//! Builds the database, the LLM generator, and the job orchestrator from
//! configuration and hands them to the handlers.

use crate::database::SqliteJobStore;
use crate::{WebConfig, WebError, WebResult};
use scout_research::llm::{create_auto_generator, TextGenerator};
use scout_research::{
    BrowserSearchFactory, Clarifier, JobOrchestrator, JobStore, ResearchConfig,
    SearchSessionFactory,
};
use std::sync::Arc;
use tracing::info;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqliteJobStore>,
    pub orchestrator: Arc<JobOrchestrator>,
    pub clarifier: Arc<Clarifier>,
}

impl AppState {
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let database_url = config
            .database_url
            .clone()
            .unwrap_or_else(|| "sqlite::memory:".to_string());
        let db = Arc::new(SqliteJobStore::new(&database_url).await?);

        let generator = create_auto_generator()
            .await
            .map_err(|e| WebError::Config(e.to_string()))?;
        let generator: Arc<dyn TextGenerator> = Arc::new(generator);

        let research_config = ResearchConfig::default();

        let clarifier = Arc::new(Clarifier::new(
            generator.clone(),
            research_config.max_clarifying_questions,
        ));

        let search_factory: Arc<dyn SearchSessionFactory> = Arc::new(BrowserSearchFactory::new());
        let store: Arc<dyn JobStore> = db.clone();

        let orchestrator = Arc::new(JobOrchestrator::new(
            generator,
            search_factory,
            store,
            research_config,
        ));

        info!("Application state initialized");

        Ok(Self {
            db,
            orchestrator,
            clarifier,
        })
    }
}
