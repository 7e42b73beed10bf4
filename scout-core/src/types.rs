//! Core data type definitions
//!
//! The persisted research-job record and its lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User assigned to a job when the request does not name one.
pub const DEFAULT_USER: &str = "researcher";

/// Lifecycle state of a research job.
///
/// Transitions are monotonic: `Running` moves exactly once to either
/// `Complete` or `Error`, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Complete,
    Error,
}

impl JobStatus {
    /// Numeric code used in the database (1 = running, 2 = complete, 3 = error).
    pub fn as_i64(&self) -> i64 {
        match self {
            JobStatus::Running => 1,
            JobStatus::Complete => 2,
            JobStatus::Error => 3,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(JobStatus::Running),
            2 => Some(JobStatus::Complete),
            3 => Some(JobStatus::Error),
            _ => None,
        }
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// One clarifying question together with the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// A persisted unit of research work.
///
/// `breadth` and `depth` are the initial budgets for the deep-research
/// recursion (both 1-5). `result` is null while running and written exactly
/// once on completion; in the error case it holds a user-facing markdown
/// error report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResearchJob {
    pub id: String,
    pub user: String,
    pub query: String,
    pub breadth: usize,
    pub depth: usize,
    pub questions: Vec<QuestionAnswer>,
    pub status: JobStatus,
    pub result: Option<String>,
    /// When set, the job runs the single-call grounded-search flow and skips
    /// the recursive deep-research branch entirely.
    pub direct_search: bool,
    pub created_at: DateTime<Utc>,
}

impl ResearchJob {
    /// Create a new job in the `Running` state with a fresh id.
    pub fn new(
        user: String,
        query: String,
        breadth: usize,
        depth: usize,
        questions: Vec<QuestionAnswer>,
        direct_search: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user,
            query,
            breadth,
            depth,
            questions,
            status: JobStatus::Running,
            result: None,
            direct_search,
            created_at: Utc::now(),
        }
    }
}
