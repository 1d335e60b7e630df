//! Pipeline assembly
//!
//! Wires the snapshot store, persistence writer, broadcaster, ingestion
//! service and historical aggregator around one durable store.

use std::sync::Arc;

use crate::api::AppState;
use crate::broadcast::SnapshotBroadcaster;
use crate::config::MonitorConfig;
use crate::history::HistoricalAggregator;
use crate::ingest::IngestionService;
use crate::persistence::PersistenceWriter;
use crate::snapshot_store::SnapshotStore;
use crate::storage::TrafficStore;

/// All pipeline components sharing one snapshot and one store
pub struct TrafficMonitor {
    pub snapshots: Arc<SnapshotStore>,
    pub broadcaster: Arc<SnapshotBroadcaster>,
    pub ingestion: Arc<IngestionService>,
    pub history: HistoricalAggregator,
    pub store: Arc<dyn TrafficStore>,
}

impl TrafficMonitor {
    pub fn new(config: &MonitorConfig, store: Arc<dyn TrafficStore>) -> Self {
        let snapshots = Arc::new(SnapshotStore::new());
        let broadcaster = Arc::new(SnapshotBroadcaster::new(config.broadcast_capacity));
        let persistence = PersistenceWriter::new(store.clone(), config.intersection_id.clone());
        let ingestion = Arc::new(IngestionService::new(
            config.topic_registry(),
            snapshots.clone(),
            persistence,
            broadcaster.clone(),
        ));
        let history = HistoricalAggregator::with_timeout(store.clone(), config.history_timeout);

        Self {
            snapshots,
            broadcaster,
            ingestion,
            history,
            store,
        }
    }

    /// State shared by the HTTP, WebSocket and SSE handlers
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(
            self.snapshots.clone(),
            self.broadcaster.clone(),
            self.history.clone(),
            self.store.clone(),
        ))
    }

    /// Close durable storage; call after ingestion has stopped
    pub async fn close(&self) {
        self.store.close().await;
    }
}
