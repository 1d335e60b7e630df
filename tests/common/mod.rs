//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use traffic_monitor::error::StorageResult;
use traffic_monitor::{
    AlertEvent, AlertType, HistoricalBucket, MonitorConfig, Period, SqliteStore, StorageError,
    TrafficLevel, TrafficMonitor, TrafficStore,
};

/// Monitor over a fresh in-memory database
pub fn sqlite_monitor() -> (TrafficMonitor, Arc<SqliteStore>) {
    sqlite_monitor_for("intersection-main")
}

pub fn sqlite_monitor_for(intersection_id: &str) -> (TrafficMonitor, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let monitor = TrafficMonitor::new(&config_for(intersection_id), store.clone());
    (monitor, store)
}

pub fn config_for(intersection_id: &str) -> MonitorConfig {
    MonitorConfig {
        intersection_id: intersection_id.to_string(),
        ..MonitorConfig::default()
    }
}

/// Store that is permanently unavailable
pub struct FailingStore;

fn outage<T>() -> StorageResult<T> {
    Err(StorageError::Unavailable("simulated outage".to_string()))
}

#[async_trait]
impl TrafficStore for FailingStore {
    async fn insert_sample(
        &self,
        _: &str,
        _: TrafficLevel,
        _: DateTime<Utc>,
    ) -> StorageResult<i64> {
        outage()
    }

    async fn patch_latest_vehicle_count(&self, _: u32) -> StorageResult<Option<i64>> {
        outage()
    }

    async fn insert_priority_event(&self, _: bool, _: DateTime<Utc>) -> StorageResult<i64> {
        outage()
    }

    async fn insert_alert(
        &self,
        _: &str,
        _: AlertType,
        _: &str,
        _: DateTime<Utc>,
    ) -> StorageResult<i64> {
        outage()
    }

    async fn historical_buckets(
        &self,
        _: Period,
        _: DateTime<Utc>,
    ) -> StorageResult<Vec<HistoricalBucket>> {
        outage()
    }

    async fn recent_alerts(&self, _: usize) -> StorageResult<Vec<AlertEvent>> {
        outage()
    }

    async fn close(&self) {}
}

/// Store whose history query never finishes in time
pub struct SlowStore {
    pub delay: Duration,
}

#[async_trait]
impl TrafficStore for SlowStore {
    async fn insert_sample(
        &self,
        _: &str,
        _: TrafficLevel,
        _: DateTime<Utc>,
    ) -> StorageResult<i64> {
        Ok(1)
    }

    async fn patch_latest_vehicle_count(&self, _: u32) -> StorageResult<Option<i64>> {
        Ok(None)
    }

    async fn insert_priority_event(&self, _: bool, _: DateTime<Utc>) -> StorageResult<i64> {
        Ok(1)
    }

    async fn insert_alert(
        &self,
        _: &str,
        _: AlertType,
        _: &str,
        _: DateTime<Utc>,
    ) -> StorageResult<i64> {
        Ok(1)
    }

    async fn historical_buckets(
        &self,
        _: Period,
        _: DateTime<Utc>,
    ) -> StorageResult<Vec<HistoricalBucket>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn recent_alerts(&self, _: usize) -> StorageResult<Vec<AlertEvent>> {
        Ok(Vec::new())
    }

    async fn close(&self) {}
}
