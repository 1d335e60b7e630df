//! Durable storage for sensor history
//!
//! This module provides the storage seam used by the pipeline:
//! - `TrafficStore`: async trait for the append/patch/query operations
//! - `SqliteStore`: SQLite-backed implementation (rusqlite)
//! - `schema`: idempotent table provisioning
//!
//! # Tables
//!
//! ```text
//! traffic_data       id | intersection_id | traffic_level | vehicles_count? | recorded_at
//! priority_vehicles  id | is_detected     | recorded_at
//! alerts             id | intersection_id | alert_type | details | is_active | recorded_at
//! ```
//!
//! All timestamps are Unix milliseconds (UTC).

pub mod schema;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageResult;
use crate::types::{AlertEvent, AlertType, HistoricalBucket, Period, TrafficLevel};

pub use sqlite::SqliteStore;

/// Operations the pipeline and the aggregator need from durable storage
///
/// Rows are only ever appended or, for the vehicle count, patched onto the
/// latest sample. Nothing is deleted.
#[async_trait]
pub trait TrafficStore: Send + Sync {
    /// Append a density sample with no vehicle count; returns the row id
    async fn insert_sample(
        &self,
        intersection_id: &str,
        level: TrafficLevel,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Set `vehicles_count` on the most recently recorded sample
    ///
    /// There is no correlation key: whatever row is newest at the time of
    /// the call gets the count. Returns the patched row id, or `None` when
    /// the table is empty.
    async fn patch_latest_vehicle_count(&self, count: u32) -> StorageResult<Option<i64>>;

    /// Append a priority vehicle detection; returns the row id
    async fn insert_priority_event(
        &self,
        detected: bool,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Append an active alert; returns the row id
    async fn insert_alert(
        &self,
        intersection_id: &str,
        alert_type: AlertType,
        details: &str,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Count samples per (level, truncated timestamp) within one trailing period
    async fn historical_buckets(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<HistoricalBucket>>;

    /// Newest alerts first
    async fn recent_alerts(&self, limit: usize) -> StorageResult<Vec<AlertEvent>>;

    /// Release the underlying connection; later calls fail
    async fn close(&self);
}
