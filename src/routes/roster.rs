use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::roster::{FetchRosterRequest, FetchRosterResponse, JobStatusResponse},
    error::AppError,
    services::roster_service::{self, FetchOutcome},
    state::SharedState,
};

/// Routes exposing the roster fetch job.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/roster/status", get(status))
        .route("/roster/fetch", post(fetch))
}

/// Return the current state of the roster fetch job.
#[utoipa::path(
    get,
    path = "/roster/status",
    tag = "roster",
    responses((status = 200, description = "Current job state", body = JobStatusResponse))
)]
pub async fn status(State(state): State<SharedState>) -> Json<JobStatusResponse> {
    Json(JobStatusResponse::from(state.roster().status()))
}

/// Trigger a roster fetch for the active template's game.
#[utoipa::path(
    post,
    path = "/roster/fetch",
    tag = "roster",
    request_body = FetchRosterRequest,
    responses(
        (status = 200, description = "Trigger outcome", body = FetchRosterResponse),
        (status = 400, description = "Active template declares no game key")
    )
)]
pub async fn fetch(
    State(state): State<SharedState>,
    payload: Option<Json<FetchRosterRequest>>,
) -> Result<Json<FetchRosterResponse>, AppError> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    let response = match roster_service::trigger_for_active(&state, payload.force).await? {
        FetchOutcome::Started => FetchRosterResponse::started(),
        FetchOutcome::AlreadyRunning => FetchRosterResponse::already_running(),
        FetchOutcome::UpToDate => FetchRosterResponse::up_to_date(),
    };
    Ok(Json(response))
}
