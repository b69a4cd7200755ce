use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether a roster fetch is currently executing.
    pub job_running: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(job_running: bool) -> Self {
        Self {
            status: "ok".to_string(),
            job_running,
        }
    }

    /// Create a health response indicating the document store is unreadable.
    pub fn degraded(job_running: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            job_running,
        }
    }
}
