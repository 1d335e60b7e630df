//! Shared application state for HTTP, WebSocket and SSE handlers

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::broadcast::{SnapshotBroadcaster, SnapshotMessage};
use crate::history::HistoricalAggregator;
use crate::snapshot_store::SnapshotStore;
use crate::storage::TrafficStore;
use crate::types::TrafficSnapshot;

/// Shared application state
pub struct AppState {
    /// Live snapshot (read-only from the API side)
    pub snapshots: Arc<SnapshotStore>,

    /// Fan-out channel for snapshot pushes
    pub broadcaster: Arc<SnapshotBroadcaster>,

    /// History query engine
    pub history: HistoricalAggregator,

    /// Durable store, for read-only listings
    pub store: Arc<dyn TrafficStore>,
}

impl AppState {
    pub fn new(
        snapshots: Arc<SnapshotStore>,
        broadcaster: Arc<SnapshotBroadcaster>,
        history: HistoricalAggregator,
        store: Arc<dyn TrafficStore>,
    ) -> Self {
        Self {
            snapshots,
            broadcaster,
            history,
            store,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> TrafficSnapshot {
        self.snapshots.current()
    }

    /// Current snapshot wrapped for a single observer
    pub fn sync_message(&self) -> SnapshotMessage {
        self.broadcaster.sync_message(self.snapshots.current())
    }

    /// Subscribe to receive snapshot pushes
    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotMessage> {
        self.broadcaster.subscribe()
    }

    /// Next push for one observer; `None` once the broadcaster is gone
    ///
    /// Missed pushes are not replayed: a lagged observer gets the latest
    /// snapshot instead.
    pub async fn next_push(
        &self,
        rx: &mut broadcast::Receiver<SnapshotMessage>,
    ) -> Option<SnapshotMessage> {
        match rx.recv().await {
            Ok(msg) => Some(msg),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                log::debug!("Observer lagged by {} pushes, re-syncing", n);
                Some(self.sync_message())
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use crate::types::TrafficLevel;

    fn state() -> AppState {
        state_with_capacity(8)
    }

    fn state_with_capacity(capacity: usize) -> AppState {
        let store: Arc<dyn TrafficStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        AppState::new(
            Arc::new(SnapshotStore::new()),
            Arc::new(SnapshotBroadcaster::new(capacity)),
            HistoricalAggregator::new(store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn test_subscribe_receives_pushes() {
        let state = state();
        let mut rx = state.subscribe();

        let snapshot = state.snapshots.apply(|s| s.traffic_level = TrafficLevel::Medium);
        state.broadcaster.publish(snapshot);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.sequence_id, 1);
        assert_eq!(msg.payload.traffic_level, TrafficLevel::Medium);
    }

    #[test]
    fn test_sync_message_carries_current_snapshot() {
        let state = state();
        state.snapshots.apply(|s| s.vehicle_count = 5);

        let msg = state.sync_message();
        assert_eq!(msg.sequence_id, 0);
        assert_eq!(msg.payload.vehicle_count, 5);
    }

    #[tokio::test]
    async fn test_next_push_delivers_in_order() {
        let state = state();
        let mut rx = state.subscribe();

        for count in [1, 2] {
            let snapshot = state.snapshots.apply(|s| s.vehicle_count = count);
            state.broadcaster.publish(snapshot);
        }

        assert_eq!(state.next_push(&mut rx).await.unwrap().payload.vehicle_count, 1);
        assert_eq!(state.next_push(&mut rx).await.unwrap().payload.vehicle_count, 2);
    }

    #[tokio::test]
    async fn test_lagged_observer_resyncs_to_latest_snapshot() {
        let state = state_with_capacity(1);
        let mut rx = state.subscribe();

        for level in [TrafficLevel::Medium, TrafficLevel::High, TrafficLevel::Low] {
            let snapshot = state.snapshots.apply(|s| s.traffic_level = level);
            state.broadcaster.publish(snapshot);
        }
        let latest = state.snapshots.apply(|s| s.vehicle_count = 40);

        // No replay of Medium/High: the observer jumps to the current state
        let msg = state.next_push(&mut rx).await.unwrap();
        assert_eq!(msg.payload, latest);
        assert_eq!(msg.sequence_id, 3);
    }

    #[tokio::test]
    async fn test_next_push_ends_when_broadcaster_dropped() {
        let broadcaster = SnapshotBroadcaster::new(4);
        let mut rx = broadcaster.subscribe();
        let store: Arc<dyn TrafficStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let state = AppState::new(
            Arc::new(SnapshotStore::new()),
            Arc::new(SnapshotBroadcaster::new(4)),
            HistoricalAggregator::new(store.clone()),
            store,
        );
        drop(broadcaster);

        assert!(state.next_push(&mut rx).await.is_none());
    }
}
