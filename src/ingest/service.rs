//! Message handling: validate, mutate, persist, broadcast

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use super::InboundMessage;
use crate::broadcast::SnapshotBroadcaster;
use crate::error::ValidationError;
use crate::persistence::PersistenceWriter;
use crate::shutdown::signalled;
use crate::snapshot_store::SnapshotStore;
use crate::topics::{SensorReading, TopicRegistry};
use crate::types::TrafficSnapshot;
use crate::utils::time::time_of_day;

/// Result of handling one transport message
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Applied to the snapshot and broadcast; carries the pushed snapshot
    Applied(TrafficSnapshot),
    /// Dropped without touching state, storage or observers
    Rejected(ValidationError),
}

/// Accepted/rejected message counters
#[derive(Debug, Default)]
pub struct IngestionStats {
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl IngestionStats {
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

/// The ingestion subscriber
pub struct IngestionService {
    registry: TopicRegistry,
    snapshots: Arc<SnapshotStore>,
    persistence: PersistenceWriter,
    broadcaster: Arc<SnapshotBroadcaster>,
    stats: IngestionStats,
}

impl IngestionService {
    pub fn new(
        registry: TopicRegistry,
        snapshots: Arc<SnapshotStore>,
        persistence: PersistenceWriter,
        broadcaster: Arc<SnapshotBroadcaster>,
    ) -> Self {
        Self {
            registry,
            snapshots,
            persistence,
            broadcaster,
            stats: IngestionStats::default(),
        }
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &IngestionStats {
        &self.stats
    }

    /// Handle one raw message from the transport
    pub async fn handle(&self, topic: &str, payload: &[u8]) -> Outcome {
        log::debug!(
            "Received message on {}: {}",
            topic,
            String::from_utf8_lossy(payload)
        );

        match self.registry.parse(topic, payload) {
            Ok(reading) => Outcome::Applied(self.apply(reading).await),
            Err(e) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                log::warn!("Dropping message on {}: {}", topic, e);
                Outcome::Rejected(e)
            }
        }
    }

    /// Apply a validated reading and push the resulting snapshot
    ///
    /// The snapshot mutation happens before persistence and is never rolled
    /// back; storage failures are swallowed by the [`PersistenceWriter`].
    pub async fn apply(&self, reading: SensorReading) -> TrafficSnapshot {
        let now = Utc::now();

        match reading {
            SensorReading::Density(level) => {
                self.snapshots.apply(|s| s.traffic_level = level);
                self.persistence.record_density(level, now).await;
            }
            SensorReading::VehicleCount(count) => {
                self.snapshots.apply(|s| s.vehicle_count = count);
                self.persistence.record_vehicle_count(count).await;
            }
            SensorReading::Emergency(detected) => {
                self.snapshots.apply(|s| {
                    s.priority_vehicle_active = detected;
                    if detected {
                        s.priority_vehicle_timestamp = Some(time_of_day(now));
                    }
                });
                if detected {
                    self.persistence.record_priority_vehicle(now).await;
                }
            }
            SensorReading::Fire { detected, level } => {
                self.snapshots.apply(|s| {
                    s.fire_detected = detected;
                    s.smoke_level = level;
                });
                if detected {
                    self.persistence.record_fire_alert(level, now).await;
                }
            }
        }

        let snapshot = self.snapshots.touch(Utc::now());
        self.broadcaster.publish(snapshot.clone());
        self.stats.accepted.fetch_add(1, Ordering::Relaxed);
        snapshot
    }

    /// Consume transport messages until shutdown begins or the channel closes
    ///
    /// Messages still queued when shutdown begins are dropped.
    pub async fn run(
        self: Arc<Self>,
        mut rx: mpsc::Receiver<InboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        log::info!("🚀 Ingestion started");

        loop {
            tokio::select! {
                biased;

                _ = signalled(&mut shutdown) => break,

                msg = rx.recv() => match msg {
                    Some(msg) => {
                        self.handle(&msg.topic, &msg.payload).await;
                    }
                    None => break,
                },
            }
        }

        rx.close();
        log::info!(
            "Ingestion stopped (accepted: {}, rejected: {})",
            self.stats.accepted(),
            self.stats.rejected()
        );
    }
}
