use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for scorecast-back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::stream,
        crate::routes::overlay::emit,
        crate::routes::overlay::data,
        crate::routes::overlay::reset_players,
        crate::routes::overlay::reset_teams,
        crate::routes::overlay::reset_all,
        crate::routes::config::set_port,
        crate::routes::templates::list,
        crate::routes::templates::set_template,
        crate::routes::roster::status,
        crate::routes::roster::fetch,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::overlay::UpdateAck,
            crate::dto::config::SetPortRequest,
            crate::dto::config::SetPortResponse,
            crate::dto::template::SetTemplateRequest,
            crate::dto::template::SetTemplateResponse,
            crate::dto::template::TemplateInfo,
            crate::dto::template::TemplateListResponse,
            crate::dto::roster::JobStatusResponse,
            crate::dto::roster::FetchRosterRequest,
            crate::dto::roster::FetchRosterResponse,
            crate::state::document::Document,
            crate::state::document::PlayerCard,
            crate::state::document::TeamCard,
            crate::state::document::CasterCard,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "overlay", description = "Scoreboard document operations"),
        (name = "config", description = "Server configuration"),
        (name = "templates", description = "Overlay template management"),
        (name = "roster", description = "Character roster fetch job"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
