use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::JobState;

/// Snapshot of the roster fetch job returned by the status route.
#[derive(Debug, Serialize, ToSchema)]
pub struct JobStatusResponse {
    /// Whether a fetch is currently executing.
    pub running: bool,
    /// Game key of the running (or most recent) fetch.
    pub key: String,
    /// RFC 3339 start timestamp while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

impl From<JobState> for JobStatusResponse {
    fn from(state: JobState) -> Self {
        Self {
            running: state.running,
            key: state.key,
            started_at: state.started_at,
        }
    }
}

/// Request to trigger a roster fetch for the active template.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FetchRosterRequest {
    /// Refetch even when the artifact already exists.
    #[serde(default)]
    pub force: bool,
}

/// Outcome of a roster fetch trigger.
#[derive(Debug, Serialize, ToSchema)]
pub struct FetchRosterResponse {
    /// `started`, `already_running`, or `up_to_date`.
    pub status: String,
}

impl FetchRosterResponse {
    /// A fetch was accepted and is now running.
    pub fn started() -> Self {
        Self {
            status: "started".to_string(),
        }
    }

    /// A fetch was already running; the trigger was dropped.
    pub fn already_running() -> Self {
        Self {
            status: "already_running".to_string(),
        }
    }

    /// The artifact already exists and no refetch was forced.
    pub fn up_to_date() -> Self {
        Self {
            status: "up_to_date".to_string(),
        }
    }
}
