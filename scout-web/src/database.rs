//! SQLite persistence for research jobs
//!
//! One row per job keyed by id, with the clarification Q&A stored as
//! serialized JSON. The orchestrator writes terminal states through the
//! [`JobStore`] trait; the HTTP handlers read through the typed accessors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_core::{JobStatus, QuestionAnswer, ResearchJob, ScoutError, ScoutResult};
use scout_research::JobStore;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::str::FromStr;

use crate::{WebError, WebResult};

/// SQLite-backed job store.
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn new(database_url: &str) -> WebResult<Self> {
        tracing::info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| WebError::Database(format!("Failed to connect to database: {}", e)))?;

        Self::create_tables(&pool).await?;
        tracing::info!("Database ready");

        Ok(Self { pool })
    }

    async fn create_tables(pool: &SqlitePool) -> WebResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS research_jobs (
                id TEXT PRIMARY KEY,
                user TEXT NOT NULL,
                query TEXT NOT NULL,
                breadth INTEGER NOT NULL,
                depth INTEGER NOT NULL,
                questions TEXT NOT NULL,
                status INTEGER NOT NULL,
                result TEXT,
                direct_search INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create research_jobs table: {}", e)))?;

        Ok(())
    }

    /// Insert a freshly created job.
    pub async fn insert_job(&self, job: &ResearchJob) -> WebResult<()> {
        let questions = serde_json::to_string(&job.questions)?;

        sqlx::query(
            "INSERT INTO research_jobs \
             (id, user, query, breadth, depth, questions, status, result, direct_search, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&job.id)
        .bind(&job.user)
        .bind(&job.query)
        .bind(job.breadth as i64)
        .bind(job.depth as i64)
        .bind(&questions)
        .bind(job.status.as_i64())
        .bind(&job.result)
        .bind(job.direct_search as i64)
        .bind(job.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to insert job: {}", e)))?;

        Ok(())
    }

    /// Fetch one job scoped by owner.
    pub async fn get_job(&self, id: &str, user: &str) -> WebResult<Option<ResearchJob>> {
        let row = sqlx::query(
            "SELECT id, user, query, breadth, depth, questions, status, result, \
             direct_search, created_at \
             FROM research_jobs WHERE id = ? AND user = ?",
        )
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to fetch job: {}", e)))?;

        row.map(row_to_job).transpose()
    }

    /// Fetch just the status and result presence for polling clients.
    pub async fn get_job_status(
        &self,
        id: &str,
        user: &str,
    ) -> WebResult<Option<(JobStatus, bool)>> {
        let row = sqlx::query("SELECT status, result FROM research_jobs WHERE id = ? AND user = ?")
            .bind(id)
            .bind(user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WebError::Database(format!("Failed to fetch job status: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status_code: i64 = row
            .try_get("status")
            .map_err(|e| WebError::Database(format!("Bad status column: {}", e)))?;
        let status = JobStatus::from_i64(status_code)
            .ok_or_else(|| WebError::Database(format!("Unknown status code: {}", status_code)))?;
        let has_result = row
            .try_get::<Option<String>, _>("result")
            .unwrap_or(None)
            .is_some();

        Ok(Some((status, has_result)))
    }

    /// List a user's jobs, newest first.
    pub async fn list_jobs(&self, user: &str) -> WebResult<Vec<ResearchJob>> {
        let rows = sqlx::query(
            "SELECT id, user, query, breadth, depth, questions, status, result, \
             direct_search, created_at \
             FROM research_jobs WHERE user = ? ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to list jobs: {}", e)))?;

        rows.into_iter().map(row_to_job).collect()
    }

    /// Perform the single allowed terminal transition for a job.
    async fn finalize(&self, id: &str, status: JobStatus, result: &str) -> ScoutResult<()> {
        let outcome = sqlx::query(
            "UPDATE research_jobs SET status = ?, result = ? WHERE id = ? AND status = ?",
        )
        .bind(status.as_i64())
        .bind(result)
        .bind(id)
        .bind(JobStatus::Running.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| ScoutError::storage(format!("Failed to finalize job: {}", e), "database"))?;

        if outcome.rows_affected() == 0 {
            return Err(ScoutError::storage(
                format!("Job {} is missing or already finalized", id),
                "database",
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn mark_complete(&self, id: &str, result: &str) -> ScoutResult<()> {
        self.finalize(id, JobStatus::Complete, result).await
    }

    async fn mark_error(&self, id: &str, result: &str) -> ScoutResult<()> {
        self.finalize(id, JobStatus::Error, result).await
    }
}

fn row_to_job(row: sqlx::sqlite::SqliteRow) -> WebResult<ResearchJob> {
    let questions_json: String = row
        .try_get("questions")
        .map_err(|e| WebError::Database(format!("Bad questions column: {}", e)))?;
    let questions: Vec<QuestionAnswer> = serde_json::from_str(&questions_json)?;

    let status_code: i64 = row
        .try_get("status")
        .map_err(|e| WebError::Database(format!("Bad status column: {}", e)))?;
    let status = JobStatus::from_i64(status_code)
        .ok_or_else(|| WebError::Database(format!("Unknown status code: {}", status_code)))?;

    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| WebError::Database(format!("Bad created_at column: {}", e)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(ResearchJob {
        id: row.try_get("id").unwrap_or_default(),
        user: row.try_get("user").unwrap_or_default(),
        query: row.try_get("query").unwrap_or_default(),
        breadth: row.try_get::<i64, _>("breadth").unwrap_or(1) as usize,
        depth: row.try_get::<i64, _>("depth").unwrap_or(1) as usize,
        questions,
        status,
        result: row.try_get::<Option<String>, _>("result").unwrap_or(None),
        direct_search: row.try_get::<i64, _>("direct_search").unwrap_or(0) != 0,
        created_at,
    })
}
