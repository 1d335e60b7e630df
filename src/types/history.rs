//! Historical aggregation types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TrafficLevel;
use crate::error::ValidationError;

/// Truncation and window granularity for history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Second,
    Minute,
    Hour,
}

impl Period {
    /// Period used by the on-demand query surface when none is given
    pub const DEFAULT: Period = Period::Minute;

    /// Parse a selector; anything but `second`, `minute` or `hour` is rejected
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "second" => Ok(Period::Second),
            "minute" => Ok(Period::Minute),
            "hour" => Ok(Period::Hour),
            other => Err(ValidationError::InvalidPeriod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Second => "second",
            Period::Minute => "minute",
            Period::Hour => "hour",
        }
    }

    /// Length of one period in milliseconds; also the bucket width and the
    /// trailing window of a query
    pub fn millis(&self) -> i64 {
        match self {
            Period::Second => 1_000,
            Period::Minute => 60_000,
            Period::Hour => 3_600_000,
        }
    }

}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

/// Count of samples sharing a traffic level and truncated timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalBucket {
    pub traffic_level: TrafficLevel,
    pub count: u64,
    #[serde(rename = "timestamp")]
    pub bucket_start: DateTime<Utc>,
}
