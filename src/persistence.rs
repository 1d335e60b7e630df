//! Persistence writer
//!
//! Forwards validated events to the [`TrafficStore`]. Storage failures are
//! logged and swallowed here: they never reach the ingestion path, so the
//! live snapshot keeps advancing even while the database is unavailable.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::storage::TrafficStore;
use crate::types::{AlertEvent, AlertType, TrafficLevel};

/// Fire-and-log wrapper around a [`TrafficStore`]
#[derive(Clone)]
pub struct PersistenceWriter {
    store: Arc<dyn TrafficStore>,
    intersection_id: String,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn TrafficStore>, intersection_id: impl Into<String>) -> Self {
        Self {
            store,
            intersection_id: intersection_id.into(),
        }
    }

    /// Append a density sample
    pub async fn record_density(&self, level: TrafficLevel, at: DateTime<Utc>) {
        match self.store.insert_sample(&self.intersection_id, level, at).await {
            Ok(id) => log::debug!("💾 traffic_data #{} ({})", id, level),
            Err(e) => log::error!("Failed to record traffic density {}: {}", level, e),
        }
    }

    /// Patch the vehicle count onto the newest sample
    pub async fn record_vehicle_count(&self, count: u32) {
        match self.store.patch_latest_vehicle_count(count).await {
            Ok(Some(id)) => log::debug!("💾 traffic_data #{} vehicles_count={}", id, count),
            Ok(None) => log::warn!("Vehicle count {} arrived before any traffic sample", count),
            Err(e) => log::error!("Failed to record vehicle count {}: {}", count, e),
        }
    }

    /// Append a positive priority vehicle detection
    pub async fn record_priority_vehicle(&self, at: DateTime<Utc>) {
        match self.store.insert_priority_event(true, at).await {
            Ok(id) => log::debug!("💾 priority_vehicles #{}", id),
            Err(e) => log::error!("Failed to record priority vehicle: {}", e),
        }
    }

    /// Append a fire alert carrying the smoke level
    pub async fn record_fire_alert(&self, smoke_level: f64, at: DateTime<Utc>) {
        let details = AlertEvent::fire_details(smoke_level);
        match self
            .store
            .insert_alert(&self.intersection_id, AlertType::Fire, &details, at)
            .await
        {
            Ok(id) => log::debug!("💾 alerts #{} ({})", id, details),
            Err(e) => log::error!("Failed to record fire alert: {}", e),
        }
    }
}
