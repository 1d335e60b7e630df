//! Integration tests for the ingestion -> snapshot -> fan-out pipeline

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{config_for, sqlite_monitor, sqlite_monitor_for, FailingStore, SlowStore};
use traffic_monitor::{
    MonitorError, Outcome, TrafficLevel, TrafficMonitor, TrafficStore, ValidationError,
};

const DENSITY: &str = "traffic/density";
const COUNT: &str = "vehicle_counter/counter11";
const EMERGENCY: &str = "traffic/emergency";
const FIRE: &str = "traffic/fire";

#[tokio::test]
async fn test_end_to_end_density_count_emergency() {
    let (monitor, store) = sqlite_monitor();
    let mut observer = monitor.broadcaster.subscribe();

    monitor.ingestion.handle(DENSITY, b"High").await;
    monitor.ingestion.handle(COUNT, b"12").await;
    monitor.ingestion.handle(EMERGENCY, b"true").await;

    let snapshot = monitor.snapshots.current();
    assert_eq!(snapshot.traffic_level, TrafficLevel::High);
    assert_eq!(snapshot.vehicle_count, 12);
    assert!(snapshot.priority_vehicle_active);
    assert!(snapshot.priority_vehicle_timestamp.is_some());

    let samples = store.samples().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].traffic_level, TrafficLevel::High);
    assert_eq!(samples[0].vehicle_count, Some(12));
    assert_eq!(store.priority_events().unwrap().len(), 1);

    // One full-snapshot push per accepted message, in order
    let mut last = None;
    for expected_seq in 1..=3 {
        let msg = observer.recv().await.unwrap();
        assert_eq!(msg.sequence_id, expected_seq);
        last = Some(msg.payload);
    }
    assert_eq!(last.unwrap(), snapshot);
}

#[tokio::test]
async fn test_each_valid_density_creates_one_sample() {
    let (monitor, store) = sqlite_monitor();

    let levels = ["Low", "High", "Medium", "Medium", "Low"];
    for level in levels {
        monitor.ingestion.handle(DENSITY, level.as_bytes()).await;
    }

    assert_eq!(monitor.snapshots.current().traffic_level, TrafficLevel::Low);
    let samples = store.samples().unwrap();
    assert_eq!(samples.len(), levels.len());
    let recorded: Vec<&str> = samples.iter().map(|s| s.traffic_level.as_str()).collect();
    assert_eq!(recorded, levels);
}

#[tokio::test]
async fn test_invalid_payloads_change_nothing() {
    let (monitor, store) = sqlite_monitor();
    monitor.ingestion.handle(DENSITY, b"Medium").await;
    let before = monitor.snapshots.current();
    let mut observer = monitor.broadcaster.subscribe();

    let invalid: [(&str, &[u8]); 7] = [
        (DENSITY, b"medium"),
        (DENSITY, b"Jammed"),
        (COUNT, b"lots"),
        (COUNT, b"-1"),
        (EMERGENCY, &[0xff, 0xfe]),
        (FIRE, b"{\"detected\":true}"),
        ("traffic/unknown", b"High"),
    ];
    for (topic, payload) in invalid {
        let outcome = monitor.ingestion.handle(topic, payload).await;
        assert!(matches!(outcome, Outcome::Rejected(_)), "{} accepted {:?}", topic, payload);
    }

    assert_eq!(monitor.snapshots.current(), before);
    let samples = store.samples().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].vehicle_count, None);
    assert!(store.priority_events().unwrap().is_empty());
    assert!(observer.try_recv().is_err());
    assert_eq!(monitor.ingestion.stats().rejected(), invalid.len() as u64);
}

#[tokio::test]
async fn test_count_patches_most_recent_sample() {
    let (monitor, store) = sqlite_monitor();

    monitor.ingestion.handle(DENSITY, b"Low").await;
    monitor.ingestion.handle(DENSITY, b"High").await;
    monitor.ingestion.handle(COUNT, b"30").await;

    let samples = store.samples().unwrap();
    assert_eq!(samples[0].vehicle_count, None);
    assert_eq!(samples[1].vehicle_count, Some(30));

    // A second count overwrites the same (still newest) row
    monitor.ingestion.handle(COUNT, b"31").await;
    let samples = store.samples().unwrap();
    assert_eq!(samples[1].vehicle_count, Some(31));
}

#[tokio::test]
async fn test_count_before_any_density_leaves_nothing_patched() {
    let (monitor, store) = sqlite_monitor();

    let outcome = monitor.ingestion.handle(COUNT, b"8").await;
    assert!(matches!(outcome, Outcome::Applied(_)));
    assert_eq!(monitor.snapshots.current().vehicle_count, 8);
    assert!(store.samples().unwrap().is_empty());

    // The earlier count is not carried over to the next sample
    monitor.ingestion.handle(DENSITY, b"Medium").await;
    assert_eq!(store.samples().unwrap()[0].vehicle_count, None);
}

#[tokio::test]
async fn test_count_lands_on_other_intersections_newer_row() {
    // Two pipelines writing to one database: the patch has no correlation
    // key and goes to whichever row is newest.
    let (main, store) = sqlite_monitor_for("intersection-main");
    let side = TrafficMonitor::new(&config_for("intersection-side"), store.clone());

    main.ingestion.handle(DENSITY, b"Low").await;
    side.ingestion.handle(DENSITY, b"High").await;
    main.ingestion.handle(COUNT, b"5").await;

    let samples = store.samples().unwrap();
    let main_row = samples.iter().find(|s| s.intersection_id == "intersection-main").unwrap();
    let side_row = samples.iter().find(|s| s.intersection_id == "intersection-side").unwrap();
    assert_eq!(main_row.vehicle_count, None);
    assert_eq!(side_row.vehicle_count, Some(5));
}

#[tokio::test]
async fn test_emergency_transitions() {
    let (monitor, store) = sqlite_monitor();

    // false -> false: nothing recorded
    monitor.ingestion.handle(EMERGENCY, b"false").await;
    assert!(store.priority_events().unwrap().is_empty());
    assert!(monitor.snapshots.current().priority_vehicle_timestamp.is_none());

    // false -> true: exactly one event and a timestamp
    monitor.ingestion.handle(EMERGENCY, b"true").await;
    let events = store.priority_events().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].detected);
    let snapshot = monitor.snapshots.current();
    assert!(snapshot.priority_vehicle_active);
    let stamped = snapshot.priority_vehicle_timestamp;
    assert!(stamped.is_some());

    // true -> true: every detection is recorded again
    monitor.ingestion.handle(EMERGENCY, b"True").await;
    assert_eq!(store.priority_events().unwrap().len(), 2);
    let stamped = monitor.snapshots.current().priority_vehicle_timestamp;

    // true -> false: snapshot flips, nothing recorded, last timestamp kept
    monitor.ingestion.handle(EMERGENCY, b"FALSE").await;
    assert_eq!(store.priority_events().unwrap().len(), 2);
    let snapshot = monitor.snapshots.current();
    assert!(!snapshot.priority_vehicle_active);
    assert_eq!(snapshot.priority_vehicle_timestamp, stamped);
}

#[tokio::test]
async fn test_any_other_emergency_token_clears_detection() {
    let (monitor, store) = sqlite_monitor();
    let mut observer = monitor.broadcaster.subscribe();

    monitor.ingestion.handle(EMERGENCY, b"true").await;
    let outcome = monitor.ingestion.handle(EMERGENCY, b"0").await;

    let Outcome::Applied(snapshot) = outcome else {
        panic!("non-true token was rejected");
    };
    assert!(!snapshot.priority_vehicle_active);
    assert_eq!(store.priority_events().unwrap().len(), 1);

    // Both messages were pushed
    observer.recv().await.unwrap();
    let pushed = observer.recv().await.unwrap();
    assert!(!pushed.payload.priority_vehicle_active);
}

#[tokio::test]
async fn test_fire_detection_alerts() {
    let (monitor, store) = sqlite_monitor();

    monitor.ingestion.handle(FIRE, br#"{"detected":true,"level":42}"#).await;
    monitor.ingestion.handle(FIRE, br#"{"detected":true,"level":57.5}"#).await;
    let snapshot = monitor.snapshots.current();
    assert!(snapshot.fire_detected);
    assert_eq!(snapshot.smoke_level, 57.5);

    monitor.ingestion.handle(FIRE, br#"{"detected":false,"level":3}"#).await;
    let snapshot = monitor.snapshots.current();
    assert!(!snapshot.fire_detected);
    assert_eq!(snapshot.smoke_level, 3.0);

    let alerts = monitor.store.recent_alerts(10).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a.intersection_id == "intersection-main"));
    let details: Vec<&str> = alerts.iter().map(|a| a.details.as_str()).collect();
    assert!(details.contains(&"Smoke level: 42"));
    assert!(details.contains(&"Smoke level: 57.5"));
    assert!(store.samples().unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_outage_does_not_block_snapshot_or_broadcast() {
    let monitor = TrafficMonitor::new(&config_for("intersection-main"), Arc::new(FailingStore));
    let mut observer = monitor.broadcaster.subscribe();

    monitor.ingestion.handle(DENSITY, b"High").await;
    monitor.ingestion.handle(COUNT, b"12").await;
    monitor.ingestion.handle(EMERGENCY, b"true").await;
    monitor.ingestion.handle(FIRE, br#"{"detected":true,"level":9}"#).await;

    let snapshot = monitor.snapshots.current();
    assert_eq!(snapshot.traffic_level, TrafficLevel::High);
    assert_eq!(snapshot.vehicle_count, 12);
    assert!(snapshot.priority_vehicle_active);
    assert!(snapshot.fire_detected);

    for _ in 0..4 {
        observer.recv().await.unwrap();
    }
    assert_eq!(monitor.ingestion.stats().accepted(), 4);
}

#[tokio::test]
async fn test_closed_store_still_lets_snapshot_advance() {
    let (monitor, store) = sqlite_monitor();
    monitor.close().await;

    let outcome = monitor.ingestion.handle(DENSITY, b"Medium").await;
    assert!(matches!(outcome, Outcome::Applied(_)));
    assert_eq!(monitor.snapshots.current().traffic_level, TrafficLevel::Medium);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_last_updated_advances_on_each_accepted_message() {
    let (monitor, _) = sqlite_monitor();
    let initial = monitor.snapshots.current().last_updated;

    let Outcome::Applied(first) = monitor.ingestion.handle(DENSITY, b"Low").await else {
        panic!("rejected");
    };
    assert!(first.last_updated >= initial);

    let rejected = monitor.ingestion.handle(DENSITY, b"???").await;
    assert!(matches!(
        rejected,
        Outcome::Rejected(ValidationError::InvalidDensity(_))
    ));
    assert_eq!(monitor.snapshots.current().last_updated, first.last_updated);
}

#[tokio::test]
async fn test_ingested_samples_show_up_in_history() {
    let (monitor, _) = sqlite_monitor();
    for level in ["High", "High", "Low"] {
        monitor.ingestion.handle(DENSITY, level.as_bytes()).await;
    }

    let buckets = monitor.history.query_raw("hour").await.unwrap();
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    assert_eq!(total, 3);
    let high: u64 = buckets
        .iter()
        .filter(|b| b.traffic_level == TrafficLevel::High)
        .map(|b| b.count)
        .sum();
    assert_eq!(high, 2);
}

#[tokio::test]
async fn test_slow_history_query_times_out() {
    let mut config = config_for("intersection-main");
    config.history_timeout = Duration::from_millis(50);
    let store = Arc::new(SlowStore {
        delay: Duration::from_secs(5),
    });
    let monitor = TrafficMonitor::new(&config, store);

    let err = monitor.history.query_raw("minute").await.unwrap_err();
    assert!(matches!(err, MonitorError::Timeout(50)));

    // Ingestion is unaffected by the stalled reader
    let outcome = monitor.ingestion.handle(DENSITY, b"High").await;
    assert!(matches!(outcome, Outcome::Applied(_)));
}
