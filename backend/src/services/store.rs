//! In-memory roster store.
//!
//! Rosters live for the lifetime of the process; persistence is handled by
//! the upstream system of record, which re-uploads snapshots on demand.
//! Snapshots are kept behind `Arc` so read-heavy analysis handlers never
//! clone the full roster.

use crate::models::RosterSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterMetadata {
    pub roster_id: i64,
    pub name: String,
    pub checksum: String,
    pub day_count: usize,
    pub membership_count: usize,
}

/// Shared, thread-safe map of roster id to snapshot.
#[derive(Clone, Default)]
pub struct RosterStore {
    inner: Arc<RosterStoreInner>,
}

#[derive(Default)]
struct RosterStoreInner {
    rosters: RwLock<HashMap<i64, Arc<RosterSnapshot>>>,
    next_id: AtomicI64,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot and return its assigned id.
    pub fn insert(&self, mut snapshot: RosterSnapshot) -> i64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        snapshot.schedule_id = Some(id);
        self.inner.rosters.write().insert(id, Arc::new(snapshot));
        id
    }

    pub fn get(&self, id: i64) -> Option<Arc<RosterSnapshot>> {
        self.inner.rosters.read().get(&id).cloned()
    }

    pub fn remove(&self, id: i64) -> bool {
        self.inner.rosters.write().remove(&id).is_some()
    }

    /// Metadata for every stored roster, sorted by id.
    pub fn list(&self) -> Vec<RosterMetadata> {
        let mut entries: Vec<RosterMetadata> = self
            .inner
            .rosters
            .read()
            .iter()
            .map(|(id, s)| RosterMetadata {
                roster_id: *id,
                name: s.name.clone(),
                checksum: s.checksum.clone(),
                day_count: s.days.len(),
                membership_count: s.memberships.len(),
            })
            .collect();
        entries.sort_by_key(|m| m.roster_id);
        entries
    }
}
