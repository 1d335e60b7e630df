//! Data types for the traffic monitor
//!
//! This module contains the live snapshot, the durable record types and the
//! historical aggregation result types.

mod history;
mod records;
mod snapshot;

pub use history::{HistoricalBucket, Period};
pub use records::{AlertEvent, AlertType, PriorityVehicleEvent, TrafficSample};
pub use snapshot::{TrafficLevel, TrafficSnapshot};
