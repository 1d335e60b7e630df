//! Utility functions and helpers
//!
//! This module contains timestamp conversion helpers.

pub mod time;

pub use time::{from_millis, time_of_day, to_millis};
