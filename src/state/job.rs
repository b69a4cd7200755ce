//! Single-flight guard around the roster fetch job.
//!
//! At most one fetch executes process-wide. A trigger that finds the guard
//! held is dropped, not queued; callers treat that as success-equivalent
//! since the in-flight run will produce the desired artifact.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{
    dto::format_system_time,
    services::sse_events::broadcast_job_status,
    state::SseHub,
};

/// Lifecycle snapshot of the roster fetch job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobState {
    /// Whether a fetch is currently executing.
    pub running: bool,
    /// Game key of the running (or most recent) fetch.
    pub key: String,
    /// RFC 3339 start timestamp while running.
    pub started_at: Option<String>,
}

/// Process-wide owner of the fetch guard and its status cell.
pub struct RosterJob {
    guard: Arc<AsyncMutex<()>>,
    status: Arc<Mutex<JobState>>,
}

impl Default for RosterJob {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterJob {
    /// Create an idle job owner.
    pub fn new() -> Self {
        Self {
            guard: Arc::new(AsyncMutex::new(())),
            status: Arc::new(Mutex::new(JobState::default())),
        }
    }

    /// Snapshot the current job state.
    pub fn status(&self) -> JobState {
        lock_status(&self.status).clone()
    }

    /// Attempt to claim the guard for `key`.
    ///
    /// Returns `None` when a fetch is already executing; the attempt is
    /// discarded, never queued. On success the job transitions to running,
    /// a `job_status` start event is published on `hub`, and the returned
    /// [`RunningJob`] releases the guard and publishes the finish event when
    /// dropped, on every exit path.
    pub fn try_accept(&self, key: &str, hub: &SseHub) -> Option<RunningJob> {
        let permit = Arc::clone(&self.guard).try_lock_owned().ok()?;

        {
            let mut status = lock_status(&self.status);
            *status = JobState {
                running: true,
                key: key.to_string(),
                started_at: Some(format_system_time(SystemTime::now())),
            };
        }
        broadcast_job_status(hub, true, key);

        Some(RunningJob {
            status: Arc::clone(&self.status),
            hub: hub.clone(),
            key: key.to_string(),
            _permit: permit,
        })
    }
}

/// Scoped token for an accepted fetch.
///
/// Holding it keeps the guard; dropping it, including through a panic in the
/// task body, returns the job to idle and publishes the finish notification.
pub struct RunningJob {
    status: Arc<Mutex<JobState>>,
    hub: SseHub,
    key: String,
    _permit: OwnedMutexGuard<()>,
}

impl RunningJob {
    /// Game key this run was accepted for.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RunningJob {
    fn drop(&mut self) {
        {
            let mut status = lock_status(&self.status);
            *status = JobState {
                running: false,
                key: self.key.clone(),
                started_at: None,
            };
        }
        broadcast_job_status(&self.hub, false, &self.key);
    }
}

fn lock_status(status: &Mutex<JobState>) -> MutexGuard<'_, JobState> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}
