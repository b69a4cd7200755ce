use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the current health status, probing the document store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let job_running = state.roster().status().running;

    if state.store().probe().await {
        HealthResponse::ok(job_running)
    } else {
        warn!("document store probe failed");
        HealthResponse::degraded(job_running)
    }
}
