//! Snapshot store - the single authoritative live state
//!
//! One writer at a time: every mutation runs under the store's mutex and
//! readers only ever receive copies, so no reader can observe a half-applied
//! message.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::types::TrafficSnapshot;

/// Owner of the process-wide [`TrafficSnapshot`]
pub struct SnapshotStore {
    snapshot: Mutex<TrafficSnapshot>,
}

impl SnapshotStore {
    /// Create a store holding the initial snapshot
    pub fn new() -> Self {
        Self::with_snapshot(TrafficSnapshot::initial(Utc::now()))
    }

    pub fn with_snapshot(snapshot: TrafficSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Apply a mutation atomically and return the resulting state
    pub fn apply<F>(&self, mutate: F) -> TrafficSnapshot
    where
        F: FnOnce(&mut TrafficSnapshot),
    {
        let mut guard = self.snapshot.lock();
        mutate(&mut guard);
        guard.clone()
    }

    /// Stamp `last_updated` and return the resulting state
    pub fn touch(&self, now: DateTime<Utc>) -> TrafficSnapshot {
        self.apply(|s| s.last_updated = now)
    }

    /// Copy of the current state
    pub fn current(&self) -> TrafficSnapshot {
        self.snapshot.lock().clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
