use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::overlay::UpdateAck,
    error::AppError,
    services::overlay_service,
    state::{SharedState, document::Document},
};

/// Routes carrying scoreboard document operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/emit", post(emit))
        .route("/data.json", get(data))
        .route("/reset/players", post(reset_players))
        .route("/reset/teams", post(reset_teams))
        .route("/reset/all", post(reset_all))
}

/// Submit a scoreboard update and broadcast it to all overlays.
#[utoipa::path(
    post,
    path = "/emit",
    tag = "overlay",
    request_body = Document,
    responses((status = 200, description = "Update persisted and broadcast", body = UpdateAck))
)]
pub async fn emit(
    State(state): State<SharedState>,
    Json(update): Json<Document>,
) -> Result<Json<UpdateAck>, AppError> {
    overlay_service::apply_update(&state, update).await?;
    Ok(Json(UpdateAck::ok()))
}

/// Return the current scoreboard document.
#[utoipa::path(
    get,
    path = "/data.json",
    tag = "overlay",
    responses((status = 200, description = "Current document", body = Document))
)]
pub async fn data(State(state): State<SharedState>) -> Json<Document> {
    Json(state.store().load().await)
}

/// Clear both player sections.
#[utoipa::path(
    post,
    path = "/reset/players",
    tag = "overlay",
    responses((status = 200, description = "Players cleared", body = UpdateAck))
)]
pub async fn reset_players(State(state): State<SharedState>) -> Result<Json<UpdateAck>, AppError> {
    overlay_service::reset_players(&state).await?;
    Ok(Json(UpdateAck::ok()))
}

/// Clear both team sections.
#[utoipa::path(
    post,
    path = "/reset/teams",
    tag = "overlay",
    responses((status = 200, description = "Teams cleared", body = UpdateAck))
)]
pub async fn reset_teams(State(state): State<SharedState>) -> Result<Json<UpdateAck>, AppError> {
    overlay_service::reset_teams(&state).await?;
    Ok(Json(UpdateAck::ok()))
}

/// Clear the whole scoreboard, keeping server-owned and UI-level keys.
#[utoipa::path(
    post,
    path = "/reset/all",
    tag = "overlay",
    responses((status = 200, description = "Scoreboard cleared", body = UpdateAck))
)]
pub async fn reset_all(State(state): State<SharedState>) -> Result<Json<UpdateAck>, AppError> {
    overlay_service::reset_all(&state).await?;
    Ok(Json(UpdateAck::ok()))
}
