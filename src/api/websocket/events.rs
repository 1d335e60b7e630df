//! WebSocket message types for the real-time channel

use serde::{Deserialize, Serialize};

use crate::broadcast::SnapshotMessage;
use crate::types::{HistoricalBucket, Period};

/// Messages pushed to observers
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full current snapshot (initial sync or after a change)
    TrafficUpdate(SnapshotMessage),

    /// Answer to `get_historical_data`
    HistoricalData {
        period: Period,
        payload: Vec<HistoricalBucket>,
    },

    /// Request-level failure; the connection stays open
    Error { code: String, message: String },

    /// Heartbeat response
    Pong,
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Client message types
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request bucketed history; the period is validated server-side
    GetHistoricalData { period: String },

    /// Ping for heartbeat
    Ping,
}
