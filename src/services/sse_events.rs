use serde::Serialize;
use tracing::warn;

use crate::{
    dto::sse::{JobStatusEvent, ServerEvent, TemplateChangedEvent},
    state::{SharedState, SseHub, document::Document},
};

/// Event carrying the full document after an update.
pub const EVENT_SCOREBOARD_UPDATED: &str = "update_scoreboard";
/// Event announcing the newly active template.
pub const EVENT_TEMPLATE_CHANGED: &str = "template_changed";
/// Event announcing roster fetch start/finish.
pub const EVENT_JOB_STATUS: &str = "job_status";

/// Broadcast the full scoreboard document to every subscriber.
pub fn broadcast_scoreboard(state: &SharedState, doc: &Document) {
    send_event(state.hub(), EVENT_SCOREBOARD_UPDATED, doc);
}

/// Broadcast an active-template change to every subscriber.
pub fn broadcast_template_changed(state: &SharedState, template: &str) {
    let payload = TemplateChangedEvent {
        template: template.to_string(),
    };
    send_event(state.hub(), EVENT_TEMPLATE_CHANGED, &payload);
}

/// Broadcast a roster job lifecycle change.
///
/// Takes the hub directly so the single-flight guard can publish its finish
/// notification from its drop path.
pub fn broadcast_job_status(hub: &SseHub, running: bool, key: &str) {
    let payload = JobStatusEvent {
        running,
        key: key.to_string(),
    };
    send_event(hub, EVENT_JOB_STATUS, &payload);
}

fn send_event<T: Serialize>(hub: &SseHub, name: &str, payload: &T) {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event = name, error = %err, "failed to serialize SSE event"),
    }
}
