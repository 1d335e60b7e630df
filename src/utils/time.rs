//! Time and timestamp utilities

use chrono::{DateTime, Local, NaiveTime, TimeZone, Timelike, Utc};

/// Unix milliseconds, the storage representation of every timestamp
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Inverse of [`to_millis`]; `None` when out of chrono's range
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

/// Local wall-clock time of day, whole seconds
pub fn time_of_day(at: DateTime<Utc>) -> NaiveTime {
    let local = at.with_timezone(&Local).time();
    local.with_nanosecond(0).unwrap_or(local)
}
