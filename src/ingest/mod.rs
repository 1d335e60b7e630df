//! Sensor ingestion
//!
//! ```text
//! MQTT broker ──► MqttTransport ──mpsc──► IngestionService::run
//!                                              │
//!                    ┌─────────────────────────┼──────────────────────┐
//!                    ▼                         ▼                      ▼
//!             SnapshotStore.apply     PersistenceWriter      SnapshotBroadcaster
//!             (single writer)         (errors logged)        (full snapshot)
//! ```

pub mod mqtt;
mod service;

pub use mqtt::{MqttSettings, MqttTransport};
pub use service::{IngestionService, IngestionStats, Outcome};

/// A raw message as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}
