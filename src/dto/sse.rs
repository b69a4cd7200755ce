use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized JSON data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the roster fetch job starts or finishes.
pub struct JobStatusEvent {
    /// Whether a fetch is currently executing.
    pub running: bool,
    /// Game key the fetch targets.
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the active overlay template changes.
pub struct TemplateChangedEvent {
    /// Name of the newly active template.
    pub template: String,
}
