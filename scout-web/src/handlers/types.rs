//! Request and response types for the job API

use scout_core::{JobStatus, QuestionAnswer};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_breadth() -> usize {
    3
}

fn default_depth() -> usize {
    2
}

/// Ask for clarifying questions about a topic.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClarifyRequest {
    pub topic: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClarifyResponse {
    pub questions: Vec<String>,
}

/// Create a research job.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJobRequest {
    pub topic: String,
    #[serde(default = "default_breadth")]
    pub breadth: usize,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
    #[serde(default)]
    pub direct_search: bool,
    /// Owner of the job; defaults to [`scout_core::DEFAULT_USER`].
    pub user: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateJobResponse {
    pub id: String,
    pub status: JobStatus,
}

/// Polling response; never carries the result itself.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    pub completed: bool,
    pub has_result: bool,
}

/// One row in the job listing; the result stays out of the summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobSummary {
    pub id: String,
    pub query: String,
    pub status: JobStatus,
    pub direct_search: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Query parameters scoping reads to a user.
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user: Option<String>,
}
