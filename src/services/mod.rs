/// Human-readable diff between two scoreboard documents.
pub mod change_audit;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Scoreboard update and reset orchestration.
pub mod overlay_service;
/// Single-flight roster fetch orchestration.
pub mod roster_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Template discovery and switching.
pub mod template_service;
