use axum::Router;

use crate::state::SharedState;

pub mod config;
pub mod docs;
pub mod health;
pub mod overlay;
pub mod roster;
pub mod sse;
pub mod templates;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(overlay::router())
        .merge(config::router())
        .merge(templates::router())
        .merge(roster::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
