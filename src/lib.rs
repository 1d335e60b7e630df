//! Traffic Monitor
//!
//! Ingests streaming sensor events from an MQTT broker, keeps a single
//! authoritative snapshot of current traffic conditions, records every
//! event durably and fans the snapshot out to live observers.
//!
//! # Pipeline
//!
//! ```text
//! MQTT ──► ingest ──► snapshot_store ──► broadcast ──► WebSocket / SSE observers
//!              │
//!              └────► persistence ──► storage (SQLite) ◄── history (bucketed queries)
//! ```
//!
//! # Modules
//!
//! - `types`: Snapshot, durable records, history buckets
//! - `topics`: Topic schema registry (payload validation)
//! - `snapshot_store`: Single-writer live state
//! - `storage`: `TrafficStore` trait and SQLite engine
//! - `persistence`: Log-and-continue writer over the store
//! - `broadcast`: Snapshot fan-out
//! - `history`: Historical aggregator
//! - `ingest`: Ingestion service and MQTT transport
//! - `api`: HTTP, WebSocket and SSE surfaces
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use traffic_monitor::{MonitorConfig, SqliteStore, TrafficMonitor};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::default();
//! let store = Arc::new(SqliteStore::open(&config.db_path)?);
//! let monitor = TrafficMonitor::new(&config, store);
//! monitor.ingestion.handle("traffic/density", b"High").await;
//! assert_eq!(monitor.snapshots.current().vehicle_count, 0);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod monitor;
pub mod persistence;
pub mod shutdown;
pub mod snapshot_store;
pub mod storage;
pub mod topics;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use broadcast::{SnapshotBroadcaster, SnapshotMessage};
pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult, StorageError, ValidationError};
pub use history::HistoricalAggregator;
pub use ingest::{InboundMessage, IngestionService, Outcome};
pub use monitor::TrafficMonitor;
pub use snapshot_store::SnapshotStore;
pub use storage::{SqliteStore, TrafficStore};
pub use types::{
    AlertEvent, AlertType, HistoricalBucket, Period, PriorityVehicleEvent, TrafficLevel,
    TrafficSample, TrafficSnapshot,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
