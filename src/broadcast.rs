//! Snapshot fan-out
//!
//! Every accepted sensor message ends with the full post-mutation snapshot
//! being published here. Delivery is best effort: no acknowledgements and
//! no replay. Observers that fall behind are re-synced with the latest
//! snapshot by their connection handler.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::TrafficSnapshot;

/// Snapshot push with fan-out metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Monotonically increasing sequence ID
    pub sequence_id: u64,

    /// Unix timestamp when the push was emitted
    pub timestamp: i64,

    pub payload: TrafficSnapshot,
}

/// Broadcaster for snapshot pushes to all connected observers
pub struct SnapshotBroadcaster {
    tx: broadcast::Sender<SnapshotMessage>,
    sequence_counter: AtomicU64,
}

impl SnapshotBroadcaster {
    /// Create a new broadcaster with the given capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sequence_counter: AtomicU64::new(0),
        }
    }

    /// Push a snapshot to every connected observer; returns its sequence ID
    pub fn publish(&self, snapshot: TrafficSnapshot) -> u64 {
        let seq = self.sequence_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let msg = SnapshotMessage {
            sequence_id: seq,
            timestamp: chrono::Utc::now().timestamp(),
            payload: snapshot,
        };
        // Ignore errors - just means no observers are connected
        let _ = self.tx.send(msg);
        seq
    }

    /// Wrap a snapshot for a single observer (initial sync, lag recovery)
    pub fn sync_message(&self, snapshot: TrafficSnapshot) -> SnapshotMessage {
        SnapshotMessage {
            sequence_id: self.current_sequence_id(),
            timestamp: chrono::Utc::now().timestamp(),
            payload: snapshot,
        }
    }

    /// Sequence ID of the last published snapshot (0 before the first)
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }

    /// Subscribe to receive future pushes
    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotMessage> {
        self.tx.subscribe()
    }
}
