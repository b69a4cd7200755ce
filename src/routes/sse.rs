use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    services::sse_service,
    state::{ClientRole, SharedState},
};

#[utoipa::path(
    get,
    path = "/sse/stream",
    tag = "sse",
    responses((status = 200, description = "Realtime event stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime scoreboard events to a connected client.
///
/// Overlays (inferred from the referer) receive a snapshot of the current
/// document before any broadcast events.
pub async fn stream(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let role = sse_service::infer_role(&headers);
    let client_id = state.register_client(role);
    let clients = state.client_count();
    match role {
        ClientRole::Overlay => info!(clients, "overlay connected"),
        ClientRole::Controller => info!(clients, "controller UI connected"),
        ClientRole::Unknown => info!(clients, "client connected"),
    }

    let receiver = sse_service::subscribe(&state);
    let initial = sse_service::initial_events(&state, role).await;
    sse_service::to_sse_stream(receiver, initial, state, client_id)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/stream", get(stream))
}
