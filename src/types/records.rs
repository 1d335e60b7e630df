//! Durable, append-only records written by the ingestion pipeline

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TrafficLevel;

/// One density reading; `vehicle_count` is patched in by a later count message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub id: i64,
    pub intersection_id: String,
    pub traffic_level: TrafficLevel,
    pub vehicle_count: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

/// A positive emergency-vehicle detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityVehicleEvent {
    pub id: i64,
    pub detected: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Kind of alert raised at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Fire,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Fire => "FIRE",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIRE" => Ok(AlertType::Fire),
            other => Err(format!("unknown alert type '{}'", other)),
        }
    }
}

/// A raised alert (currently only fire/smoke detections)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: i64,
    pub intersection_id: String,
    pub alert_type: AlertType,
    pub details: String,
    pub active: bool,
    pub recorded_at: DateTime<Utc>,
}

impl AlertEvent {
    /// Details text stored with a fire alert
    pub fn fire_details(smoke_level: f64) -> String {
        format!("Smoke level: {}", smoke_level)
    }
}
