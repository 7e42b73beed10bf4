//! Research job handlers
//!
//! Job creation is fire-and-forget: the handler inserts a Running row,
//! spawns the orchestrator on a background task, and returns the id; the
//! browser polls the status endpoint until the job reaches a terminal
//! state.

use super::types::{
    ClarifyRequest, ClarifyResponse, CreateJobRequest, CreateJobResponse, JobStatusResponse,
    JobSummary, UserParams,
};
use crate::{validation, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use scout_core::{ResearchJob, DEFAULT_USER};
use tracing::{error, info, warn};

/// Generate clarifying questions for a topic
#[utoipa::path(
    post,
    path = "/api/jobs/questions",
    tag = "Jobs",
    request_body = ClarifyRequest,
    responses(
        (status = 200, description = "Clarifying questions generated", body = ClarifyResponse),
        (status = 400, description = "Invalid topic"),
        (status = 500, description = "Generation failed")
    )
)]
pub async fn clarify_questions(
    State(state): State<AppState>,
    Json(request): Json<ClarifyRequest>,
) -> Result<Json<ClarifyResponse>, StatusCode> {
    if let Err(e) = validation::validate_topic(&request.topic) {
        warn!("Rejected clarify request: {}", e);
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.clarifier.clarify(&request.topic).await {
        Ok(questions) => Ok(Json(ClarifyResponse { questions })),
        Err(e) => {
            error!("Failed to generate clarifying questions: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Create a research job and start it in the background
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 200, description = "Job created and running", body = CreateJobResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Failed to create job")
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, StatusCode> {
    if let Err(errors) = validation::validate_create_request(&request) {
        warn!("Rejected job creation: {}", errors.join("; "));
        return Err(StatusCode::BAD_REQUEST);
    }

    let user = request.user.unwrap_or_else(|| DEFAULT_USER.to_string());
    let job = ResearchJob::new(
        user,
        request.topic,
        request.breadth,
        request.depth,
        request.questions,
        request.direct_search,
    );

    if let Err(e) = state.db.insert_job(&job).await {
        error!("Failed to persist job {}: {}", job.id, e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(
        "Created research job {} for user {} (direct: {})",
        job.id, job.user, job.direct_search
    );

    // Run the job to completion in the background; the orchestrator has
    // already persisted the outcome by the time an error surfaces here,
    // so it is logged and dropped.
    let orchestrator = state.orchestrator.clone();
    let id = job.id.clone();
    let status = job.status;
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(&job).await {
            error!("Research job {} failed: {}", job.id, e);
        }
    });

    Ok(Json(CreateJobResponse { id, status }))
}

/// Poll the status of a job
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/status",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Current job status", body = JobStatusResponse),
        (status = 404, description = "Job not found"),
        (status = 500, description = "Failed to read job status")
    )
)]
pub async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserParams>,
) -> Result<Json<JobStatusResponse>, StatusCode> {
    let user = params.user.unwrap_or_else(|| DEFAULT_USER.to_string());

    match state.db.get_job_status(&id, &user).await {
        Ok(Some((status, has_result))) => Ok(Json(JobStatusResponse {
            id,
            status,
            completed: status == scout_core::JobStatus::Complete,
            has_result,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to read status for job {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Fetch a job record, including the result once the job is finished
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job record", body = scout_core::ResearchJob),
        (status = 404, description = "Job not found"),
        (status = 500, description = "Failed to read job")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserParams>,
) -> Result<Json<ResearchJob>, StatusCode> {
    let user = params.user.unwrap_or_else(|| DEFAULT_USER.to_string());

    match state.db.get_job(&id, &user).await {
        Ok(Some(job)) => Ok(Json(job)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to read job {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// List a user's jobs, newest first
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    responses(
        (status = 200, description = "Job listing"),
        (status = 500, description = "Failed to list jobs")
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<JobSummary>>, StatusCode> {
    let user = params.user.unwrap_or_else(|| DEFAULT_USER.to_string());

    match state.db.list_jobs(&user).await {
        Ok(jobs) => Ok(Json(
            jobs.into_iter()
                .map(|job| JobSummary {
                    id: job.id,
                    query: job.query,
                    status: job.status,
                    direct_search: job.direct_search,
                    created_at: job.created_at,
                })
                .collect(),
        )),
        Err(e) => {
            error!("Failed to list jobs for {}: {}", user, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
