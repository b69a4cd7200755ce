pub mod document;
pub mod job;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::document_store::DocumentStore,
    services::roster_service::{ProcessRosterTask, RosterTask},
};

pub use self::job::{JobState, RosterJob, RunningJob};
pub use self::sse::SseHub;

/// Cheaply clonable handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Broadcast channel capacity for the SSE hub.
const SSE_CAPACITY: usize = 16;

/// Best-effort classification of a connected SSE client.
///
/// Only decides whether the client gets an initial document push; it never
/// gates broadcast delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    /// An overlay display mirroring the scoreboard.
    Overlay,
    /// The controller UI driving updates.
    Controller,
    /// Anything we could not classify.
    Unknown,
}

/// Central application state wiring the store, the notification hub, and the
/// single-flight roster job.
///
/// Constructed once at startup and passed by shared ownership to request
/// handlers; tests build fresh instances for isolation.
pub struct AppState {
    config: AppConfig,
    store: DocumentStore,
    hub: SseHub,
    roster: RosterJob,
    roster_task: Arc<dyn RosterTask>,
    clients: DashMap<Uuid, ClientRole>,
}

impl AppState {
    /// Construct the shared state with the production roster task backing.
    pub fn new(config: AppConfig) -> SharedState {
        let task = Arc::new(ProcessRosterTask::from_config(&config));
        Self::with_roster_task(config, task)
    }

    /// Construct the shared state with a caller-provided roster task.
    pub fn with_roster_task(config: AppConfig, roster_task: Arc<dyn RosterTask>) -> SharedState {
        let store = DocumentStore::new(config.data_file.clone());
        Arc::new(Self {
            config,
            store,
            hub: SseHub::new(SSE_CAPACITY),
            roster: RosterJob::new(),
            roster_task,
            clients: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The document store owning the persisted scoreboard.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Broadcast hub used for the SSE stream.
    pub fn hub(&self) -> &SseHub {
        &self.hub
    }

    /// Single-flight owner of the roster fetch job.
    pub fn roster(&self) -> &RosterJob {
        &self.roster
    }

    /// Task backing executed by an accepted roster fetch.
    pub fn roster_task(&self) -> Arc<dyn RosterTask> {
        Arc::clone(&self.roster_task)
    }

    /// Track a newly connected SSE client, returning its registry id.
    pub fn register_client(&self, role: ClientRole) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(id, role);
        id
    }

    /// Forget a disconnected SSE client, returning the role it had.
    pub fn remove_client(&self, id: Uuid) -> Option<ClientRole> {
        self.clients.remove(&id).map(|(_, role)| role)
    }

    /// Number of currently connected SSE clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
