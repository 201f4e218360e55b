//! Application state for the HTTP server.

use crate::services::job_tracker::JobTracker;
use crate::services::store::RosterStore;

/// Shared application state passed to all handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// In-memory roster snapshots
    pub rosters: RosterStore,
    /// Tracker for background ingest jobs
    pub job_tracker: JobTracker,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
