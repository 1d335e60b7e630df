//! Live traffic snapshot types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Congestion level reported by the density sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficLevel {
    Low,
    Medium,
    High,
}

impl TrafficLevel {
    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLevel::Low => "Low",
            TrafficLevel::Medium => "Medium",
            TrafficLevel::High => "High",
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficLevel {
    type Err = String;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(TrafficLevel::Low),
            "Medium" => Ok(TrafficLevel::Medium),
            "High" => Ok(TrafficLevel::High),
            other => Err(format!("unknown traffic level '{}'", other)),
        }
    }
}

/// Current state of the monitored intersection
///
/// Exactly one instance lives in the process, owned by
/// [`SnapshotStore`](crate::snapshot_store::SnapshotStore). Observers only
/// ever see copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    #[serde(rename = "trafficLevel")]
    pub traffic_level: TrafficLevel,
    #[serde(rename = "vehicleCount")]
    pub vehicle_count: u32,
    #[serde(rename = "priorityVehicles")]
    pub priority_vehicle_active: bool,
    #[serde(rename = "priorityTimestamp", with = "time_of_day")]
    pub priority_vehicle_timestamp: Option<NaiveTime>,
    #[serde(rename = "fireAlert")]
    pub fire_detected: bool,
    #[serde(rename = "smokeLevel")]
    pub smoke_level: f64,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl TrafficSnapshot {
    /// Snapshot reported before any sensor message has been accepted
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            traffic_level: TrafficLevel::Low,
            vehicle_count: 0,
            priority_vehicle_active: false,
            priority_vehicle_timestamp: None,
            fire_detected: false,
            smoke_level: 0.0,
            last_updated: now,
        }
    }
}

/// `HH:MM:SS` encoding for the priority vehicle time-of-day
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
