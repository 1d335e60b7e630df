//! Error types for the traffic monitor.
//!
//! Validation and storage failures are isolated per message or request;
//! only errors raised while starting up are allowed to end the process.

use thiserror::Error;

/// A payload or query parameter outside the accepted domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Payload is not valid UTF-8")]
    NotUtf8,

    #[error("Invalid traffic density payload: {0:?}")]
    InvalidDensity(String),

    #[error("Invalid vehicle count payload: {0:?}")]
    InvalidVehicleCount(String),

    #[error("Invalid fire payload: {0}")]
    InvalidFire(String),

    #[error("Invalid period. Valid values are: second, minute, hour.")]
    InvalidPeriod(String),
}

/// Durable storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage connection is closed")]
    Closed,

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Transport (message broker) failure.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Subscription to {topic} failed: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Top-level error type surfaced to callers of the query operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Query timed out after {0} ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result alias for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
