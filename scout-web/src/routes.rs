//! Route definitions for the Scout web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Clarifying questions
        .route("/jobs/questions", post(handlers::clarify_questions))
        // Job lifecycle
        .route("/jobs", post(handlers::create_job))
        .route("/jobs", get(handlers::list_jobs))
        .route("/jobs/{id}", get(handlers::get_job))
        .route("/jobs/{id}/status", get(handlers::job_status))
}
