//! Monitor configuration from environment variables

use std::env;
use std::time::Duration;

use crate::history::DEFAULT_QUERY_TIMEOUT;
use crate::ingest::MqttSettings;
use crate::topics::{
    TopicRegistry, DEFAULT_DENSITY_TOPIC, DEFAULT_EMERGENCY_TOPIC, DEFAULT_FIRE_TOPIC,
    DEFAULT_VEHICLE_COUNT_TOPIC,
};

/// Configuration for the traffic monitor
///
/// Loaded from environment variables (and `.env`) with sensible defaults.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// HTTP/WebSocket listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub db_path: String,

    /// Broker connection
    pub mqtt: MqttSettings,

    /// Intersection recorded on samples and alerts
    pub intersection_id: String,

    pub topic_density: String,
    pub topic_vehicle_count: String,
    pub topic_emergency: String,
    pub topic_fire: String,

    /// Upper bound on a single history query
    pub history_timeout: Duration,

    /// Snapshot pushes buffered per observer before it is re-synced
    pub broadcast_capacity: usize,

    /// Ingestion channel size (messages)
    pub channel_buffer: usize,

    /// Directory of static dashboard assets
    pub static_dir: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: "traffic.db".to_string(),
            mqtt: MqttSettings::default(),
            intersection_id: "intersection-main".to_string(),
            topic_density: DEFAULT_DENSITY_TOPIC.to_string(),
            topic_vehicle_count: DEFAULT_VEHICLE_COUNT_TOPIC.to_string(),
            topic_emergency: DEFAULT_EMERGENCY_TOPIC.to_string(),
            topic_fire: DEFAULT_FIRE_TOPIC.to_string(),
            history_timeout: DEFAULT_QUERY_TIMEOUT,
            broadcast_capacity: 64,
            channel_buffer: 1_024,
            static_dir: "public".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `PORT` (default: 3000)
    /// - `DB_PATH` (default: traffic.db)
    /// - `MQTT_HOST` / `MQTT_SERVER` (default: localhost)
    /// - `MQTT_PORT` (default: 1883)
    /// - `MQTT_CLIENT_ID` (default: traffic-monitor)
    /// - `INTERSECTION_ID` (default: intersection-main)
    /// - `TOPIC_DENSITY`, `TOPIC_VEHICLE_COUNT`, `TOPIC_EMERGENCY`, `TOPIC_FIRE`
    /// - `HISTORY_TIMEOUT_MS` (default: 5000)
    /// - `BROADCAST_CAPACITY` (default: 64)
    /// - `INGEST_CHANNEL_BUFFER` (default: 1024)
    /// - `STATIC_DIR` (default: public)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT", defaults.port),
            db_path: string("DB_PATH", &defaults.db_path),
            mqtt: MqttSettings {
                host: env::var("MQTT_HOST")
                    .or_else(|_| env::var("MQTT_SERVER"))
                    .unwrap_or(defaults.mqtt.host),
                port: parsed("MQTT_PORT", defaults.mqtt.port),
                client_id: string("MQTT_CLIENT_ID", &defaults.mqtt.client_id),
                keep_alive: defaults.mqtt.keep_alive,
            },
            intersection_id: string("INTERSECTION_ID", &defaults.intersection_id),
            topic_density: string("TOPIC_DENSITY", &defaults.topic_density),
            topic_vehicle_count: string("TOPIC_VEHICLE_COUNT", &defaults.topic_vehicle_count),
            topic_emergency: string("TOPIC_EMERGENCY", &defaults.topic_emergency),
            topic_fire: string("TOPIC_FIRE", &defaults.topic_fire),
            history_timeout: env::var("HISTORY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.history_timeout),
            broadcast_capacity: parsed("BROADCAST_CAPACITY", defaults.broadcast_capacity),
            channel_buffer: parsed("INGEST_CHANNEL_BUFFER", defaults.channel_buffer),
            static_dir: string("STATIC_DIR", &defaults.static_dir),
        }
    }

    /// Topic registry for the configured topic names
    pub fn topic_registry(&self) -> TopicRegistry {
        TopicRegistry::new(
            &self.topic_density,
            &self.topic_vehicle_count,
            &self.topic_emergency,
            &self.topic_fire,
        )
    }
}

fn string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
