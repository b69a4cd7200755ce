use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::config::{SetPortRequest, SetPortResponse},
    error::AppError,
    services::overlay_service::{self, PortOutcome},
    state::SharedState,
};

/// Routes carrying server configuration operations.
pub fn router() -> Router<SharedState> {
    Router::new().route("/config/port", post(set_port))
}

/// Change the configured listen port; takes effect on restart.
#[utoipa::path(
    post,
    path = "/config/port",
    tag = "config",
    request_body = SetPortRequest,
    responses(
        (status = 200, description = "Port stored", body = SetPortResponse),
        (status = 400, description = "Port outside 1-65535")
    )
)]
pub async fn set_port(
    State(state): State<SharedState>,
    Json(payload): Json<SetPortRequest>,
) -> Result<Json<SetPortResponse>, AppError> {
    payload.validate()?;
    let port = u16::try_from(payload.port)
        .map_err(|_| AppError::BadRequest("port outside valid range".to_string()))?;

    let response = match overlay_service::set_port(&state, port).await? {
        PortOutcome::Unchanged(port) => SetPortResponse::unchanged(port),
        PortOutcome::Saved(port) => SetPortResponse::saved(port),
    };
    Ok(Json(response))
}
