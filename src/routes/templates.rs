use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::template::{SetTemplateRequest, SetTemplateResponse, TemplateListResponse},
    error::AppError,
    services::template_service,
    state::SharedState,
};

/// Routes managing overlay templates.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/templates/list", get(list))
        .route("/set-template", post(set_template))
}

/// List available templates and the currently active one.
#[utoipa::path(
    get,
    path = "/templates/list",
    tag = "templates",
    responses((status = 200, description = "Available templates", body = TemplateListResponse))
)]
pub async fn list(State(state): State<SharedState>) -> Json<TemplateListResponse> {
    let (templates, active) = template_service::list(&state).await;
    Json(TemplateListResponse { templates, active })
}

/// Switch the active overlay template.
#[utoipa::path(
    post,
    path = "/set-template",
    tag = "templates",
    request_body = SetTemplateRequest,
    responses(
        (status = 200, description = "Template switched", body = SetTemplateResponse),
        (status = 404, description = "No such template")
    )
)]
pub async fn set_template(
    State(state): State<SharedState>,
    Json(payload): Json<SetTemplateRequest>,
) -> Result<Json<SetTemplateResponse>, AppError> {
    payload.validate()?;
    template_service::switch_template(&state, &payload.template, payload.force).await?;
    Ok(Json(SetTemplateResponse { ok: true }))
}
