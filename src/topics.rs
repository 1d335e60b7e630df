//! Topic schema registry
//!
//! Maps transport topic names to the payload schema carried on them and
//! turns raw payloads into typed [`SensorReading`]s.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::types::TrafficLevel;

pub const DEFAULT_DENSITY_TOPIC: &str = "traffic/density";
pub const DEFAULT_VEHICLE_COUNT_TOPIC: &str = "vehicle_counter/counter11";
pub const DEFAULT_EMERGENCY_TOPIC: &str = "traffic/emergency";
pub const DEFAULT_FIRE_TOPIC: &str = "traffic/fire";

/// Payload schema of a subscribed topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Density,
    VehicleCount,
    Emergency,
    Fire,
}

/// A validated sensor message
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading {
    Density(TrafficLevel),
    VehicleCount(u32),
    Emergency(bool),
    Fire { detected: bool, level: f64 },
}

#[derive(Debug, Deserialize)]
struct FirePayload {
    detected: bool,
    level: f64,
}

/// Topic name to schema mapping
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    topics: Vec<(String, TopicKind)>,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENSITY_TOPIC,
            DEFAULT_VEHICLE_COUNT_TOPIC,
            DEFAULT_EMERGENCY_TOPIC,
            DEFAULT_FIRE_TOPIC,
        )
    }
}

impl TopicRegistry {
    pub fn new(density: &str, vehicle_count: &str, emergency: &str, fire: &str) -> Self {
        Self {
            topics: vec![
                (density.to_string(), TopicKind::Density),
                (vehicle_count.to_string(), TopicKind::VehicleCount),
                (emergency.to_string(), TopicKind::Emergency),
                (fire.to_string(), TopicKind::Fire),
            ],
        }
    }

    /// Topics the subscriber must subscribe to
    pub fn subscriptions(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|(name, _)| name.as_str())
    }

    pub fn kind_of(&self, topic: &str) -> Option<TopicKind> {
        self.topics
            .iter()
            .find(|(name, _)| name == topic)
            .map(|(_, kind)| *kind)
    }

    /// Resolve the topic and validate its payload
    pub fn parse(&self, topic: &str, payload: &[u8]) -> Result<SensorReading, ValidationError> {
        let kind = self
            .kind_of(topic)
            .ok_or_else(|| ValidationError::UnknownTopic(topic.to_string()))?;
        parse_payload(kind, payload)
    }
}

/// Validate a payload against the schema of `kind`
pub fn parse_payload(kind: TopicKind, payload: &[u8]) -> Result<SensorReading, ValidationError> {
    let text = std::str::from_utf8(payload).map_err(|_| ValidationError::NotUtf8)?;

    match kind {
        TopicKind::Density => text
            .parse::<TrafficLevel>()
            .map(SensorReading::Density)
            .map_err(|_| ValidationError::InvalidDensity(text.to_string())),

        TopicKind::VehicleCount => text
            .trim()
            .parse::<u32>()
            .map(SensorReading::VehicleCount)
            .map_err(|_| ValidationError::InvalidVehicleCount(text.to_string())),

        // Only `true` (any case) is a detection; every other token clears it
        TopicKind::Emergency => Ok(SensorReading::Emergency(text.eq_ignore_ascii_case("true"))),

        TopicKind::Fire => {
            let fire: FirePayload = serde_json::from_str(text)
                .map_err(|e| ValidationError::InvalidFire(e.to_string()))?;
            if !fire.level.is_finite() {
                return Err(ValidationError::InvalidFire(format!(
                    "level must be finite, got {}",
                    fire.level
                )));
            }
            Ok(SensorReading::Fire {
                detected: fire.detected,
                level: fire.level,
            })
        }
    }
}
