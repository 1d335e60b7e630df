//! SQLite implementation of [`TrafficStore`]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::{schema, TrafficStore};
use crate::error::{StorageError, StorageResult};
use crate::types::{
    AlertEvent, AlertType, HistoricalBucket, Period, PriorityVehicleEvent, TrafficLevel,
    TrafficSample,
};
use crate::utils::time::{from_millis, to_millis};

/// SQLite-backed store
///
/// A single connection guarded by a mutex; `None` once closed. Trait
/// operations run on tokio's blocking pool so a long query never stalls a
/// runtime worker and callers can time out while it runs.
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Open (or create) a database file and provision the schema
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        log::info!("✅ SQLite database opened at {}", path.as_ref().display());
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        schema::provision(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run `f` against the open connection on the calling thread
    fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        locked(&self.conn, f)
    }

    /// Run `f` against the open connection on the blocking pool
    async fn run_blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || locked(&conn, f))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    /// Whether [`TrafficStore::close`] has run
    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    /// All samples in insertion order (blocking)
    pub fn samples(&self) -> StorageResult<Vec<TrafficSample>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, intersection_id, traffic_level, vehicles_count, recorded_at
                 FROM traffic_data ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<u32>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, intersection_id, level, vehicle_count, recorded_at)| {
                    Ok(TrafficSample {
                        id,
                        intersection_id,
                        traffic_level: parse_level(&level)?,
                        vehicle_count,
                        recorded_at: parse_millis(recorded_at)?,
                    })
                })
                .collect()
        })
    }

    /// Most recently recorded sample, using the same ordering as the count patch
    pub fn latest_sample(&self) -> StorageResult<Option<TrafficSample>> {
        let samples = self.samples()?;
        Ok(samples
            .into_iter()
            .max_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id))))
    }

    /// All priority vehicle events in insertion order
    pub fn priority_events(&self) -> StorageResult<Vec<PriorityVehicleEvent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, is_detected, recorded_at FROM priority_vehicles ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, detected, recorded_at)| {
                    Ok(PriorityVehicleEvent {
                        id,
                        detected,
                        recorded_at: parse_millis(recorded_at)?,
                    })
                })
                .collect()
        })
    }

    fn query_alerts(conn: &Connection, limit: usize) -> StorageResult<Vec<AlertEvent>> {
        let mut stmt = conn.prepare(
            "SELECT id, intersection_id, alert_type, details, is_active, recorded_at
             FROM alerts ORDER BY recorded_at DESC, id DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, intersection_id, alert_type, details, active, recorded_at)| {
                Ok(AlertEvent {
                    id,
                    intersection_id,
                    alert_type: alert_type.parse::<AlertType>().map_err(StorageError::Corrupt)?,
                    details: details.unwrap_or_default(),
                    active,
                    recorded_at: parse_millis(recorded_at)?,
                })
            })
            .collect()
    }
}

fn locked<T, F>(conn: &Mutex<Option<Connection>>, f: F) -> StorageResult<T>
where
    F: FnOnce(&Connection) -> StorageResult<T>,
{
    let guard = conn.lock();
    match guard.as_ref() {
        Some(conn) => f(conn),
        None => Err(StorageError::Closed),
    }
}

fn parse_level(raw: &str) -> StorageResult<TrafficLevel> {
    raw.parse::<TrafficLevel>().map_err(StorageError::Corrupt)
}

fn parse_millis(ms: i64) -> StorageResult<DateTime<Utc>> {
    from_millis(ms).ok_or_else(|| StorageError::Corrupt(format!("timestamp out of range: {}", ms)))
}

#[async_trait]
impl TrafficStore for SqliteStore {
    async fn insert_sample(
        &self,
        intersection_id: &str,
        level: TrafficLevel,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let intersection_id = intersection_id.to_string();
        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT INTO traffic_data (intersection_id, traffic_level, recorded_at)
                 VALUES (?1, ?2, ?3)",
                params![intersection_id, level.as_str(), to_millis(recorded_at)],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn patch_latest_vehicle_count(&self, count: u32) -> StorageResult<Option<i64>> {
        self.run_blocking(move |conn| {
            let latest: Option<i64> = conn
                .query_row(
                    "SELECT id FROM traffic_data ORDER BY recorded_at DESC, id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(id) = latest {
                conn.execute(
                    "UPDATE traffic_data SET vehicles_count = ?1 WHERE id = ?2",
                    params![count, id],
                )?;
            }
            Ok(latest)
        })
        .await
    }

    async fn insert_priority_event(
        &self,
        detected: bool,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64> {
        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT INTO priority_vehicles (is_detected, recorded_at) VALUES (?1, ?2)",
                params![detected, to_millis(recorded_at)],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn insert_alert(
        &self,
        intersection_id: &str,
        alert_type: AlertType,
        details: &str,
        recorded_at: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let intersection_id = intersection_id.to_string();
        let details = details.to_string();
        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT INTO alerts (intersection_id, alert_type, details, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    intersection_id,
                    alert_type.as_str(),
                    details,
                    to_millis(recorded_at)
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn historical_buckets(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> StorageResult<Vec<HistoricalBucket>> {
        let unit = period.millis();
        let since = to_millis(now) - unit;

        self.run_blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT traffic_level, COUNT(*) AS count, (recorded_at / ?1) * ?1 AS bucket
                 FROM traffic_data
                 WHERE recorded_at > ?2
                 GROUP BY traffic_level, bucket
                 ORDER BY bucket ASC, traffic_level ASC",
            )?;
            let rows = stmt
                .query_map(params![unit, since], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(level, count, bucket)| {
                    Ok(HistoricalBucket {
                        traffic_level: parse_level(&level)?,
                        count: u64::try_from(count).unwrap_or(0),
                        bucket_start: parse_millis(bucket)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn recent_alerts(&self, limit: usize) -> StorageResult<Vec<AlertEvent>> {
        self.run_blocking(move |conn| Self::query_alerts(conn, limit)).await
    }

    async fn close(&self) {
        let conn = Arc::clone(&self.conn);
        let closed = tokio::task::spawn_blocking(move || {
            let taken = conn.lock().take();
            taken.map(|conn| conn.close())
        })
        .await;

        match closed {
            Ok(Some(Ok(()))) => log::info!("🔒 Database connection closed"),
            Ok(Some(Err((_, e)))) => log::error!("Error closing database connection: {}", e),
            Ok(None) => {}
            Err(e) => log::error!("Database close task failed: {}", e),
        }
    }
}
