//! Historical aggregator
//!
//! Bucketed count-by-level queries over one trailing period of recorded
//! samples. Served identically to WebSocket observers and REST callers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{MonitorError, MonitorResult};
use crate::storage::TrafficStore;
use crate::types::{HistoricalBucket, Period};

/// Default bound on a single history query
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only query engine over durable samples
#[derive(Clone)]
pub struct HistoricalAggregator {
    store: Arc<dyn TrafficStore>,
    timeout: Duration,
}

impl HistoricalAggregator {
    pub fn new(store: Arc<dyn TrafficStore>) -> Self {
        Self::with_timeout(store, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn TrafficStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Validate a raw period selector and run the query
    pub async fn query_raw(&self, period: &str) -> MonitorResult<Vec<HistoricalBucket>> {
        let period = Period::parse(period)?;
        self.query(period).await
    }

    /// Buckets for the trailing `period` ending now
    pub async fn query(&self, period: Period) -> MonitorResult<Vec<HistoricalBucket>> {
        self.query_at(period, Utc::now()).await
    }

    /// Buckets for the trailing `period` ending at `now`, ascending by bucket start
    pub async fn query_at(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> MonitorResult<Vec<HistoricalBucket>> {
        match tokio::time::timeout(self.timeout, self.store.historical_buckets(period, now)).await {
            Ok(Ok(buckets)) => {
                log::debug!("📈 {} bucket(s) for period={}", buckets.len(), period);
                Ok(buckets)
            }
            Ok(Err(e)) => {
                log::error!("Error retrieving historical data: {}", e);
                Err(MonitorError::Storage(e))
            }
            Err(_) => {
                let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                log::error!("Historical query for period={} timed out after {} ms", period, ms);
                Err(MonitorError::Timeout(ms))
            }
        }
    }
}
