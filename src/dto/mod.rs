use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Port configuration payloads.
pub mod config;
/// Health check payloads.
pub mod health;
/// Scoreboard update payloads.
pub mod overlay;
/// Roster fetch payloads.
pub mod roster;
/// Server-Sent Events payloads.
pub mod sse;
/// Template listing and switching payloads.
pub mod template;
/// Validation helpers shared by request DTOs.
pub mod validation;

/// Render a [`SystemTime`] as an RFC 3339 string for payloads and job state.
pub fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
