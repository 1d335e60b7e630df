//! Idempotent schema provisioning

use rusqlite::Connection;

/// Table definitions; every statement is safe to run on every start
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS traffic_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    intersection_id TEXT NOT NULL,
    traffic_level TEXT NOT NULL,
    vehicles_count INTEGER,
    recorded_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
);

CREATE INDEX IF NOT EXISTS idx_traffic_data_recorded_at
    ON traffic_data (recorded_at);

CREATE TABLE IF NOT EXISTS priority_vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    is_detected INTEGER NOT NULL,
    recorded_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
);

CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    intersection_id TEXT NOT NULL,
    alert_type TEXT NOT NULL,
    details TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    recorded_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
);
"#;

/// Create any missing tables and indexes
pub fn provision(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    log::info!("📊 Database tables initialized");
    Ok(())
}
