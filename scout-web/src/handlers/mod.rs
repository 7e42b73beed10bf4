//! HTTP request handlers

pub mod jobs;
pub mod types;

pub use jobs::{clarify_questions, create_job, get_job, job_status, list_jobs};

use axum::response::Json;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "System",
    responses((status = 200, description = "Service is healthy"))
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "scout-web",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
