//! Traffic Monitor - Binary Entry Point
//!
//! Startup order: configuration, database (fatal on failure), MQTT
//! transport, ingestion, HTTP server. Ctrl+C / SIGTERM stops ingestion and
//! the transport, closes the database, then exits with status 0.

use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use traffic_monitor::api::create_app;
use traffic_monitor::ingest::MqttTransport;
use traffic_monitor::shutdown::{signalled, Shutdown};
use traffic_monitor::{MonitorConfig, SqliteStore, TrafficMonitor};

/// Grace period for in-flight HTTP requests after shutdown begins
const HTTP_DRAIN: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MonitorConfig::from_env();
    info!("🚦 Traffic Monitor v{}", traffic_monitor::VERSION);
    info!("   ├─ Database: {}", config.db_path);
    info!("   ├─ Broker: {}:{}", config.mqtt.host, config.mqtt.port);
    info!("   ├─ Intersection: {}", config.intersection_id);
    info!("   └─ HTTP port: {}", config.port);

    // Running without persistence is not an option
    let store = match SqliteStore::open(&config.db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Error connecting to the database: {}", e);
            std::process::exit(1);
        }
    };

    let monitor = TrafficMonitor::new(&config, store);

    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.trigger())?;
    }

    // Transport -> ingestion channel
    let (tx, rx) = mpsc::channel(config.channel_buffer);
    let transport = MqttTransport::new(&config.mqtt, monitor.ingestion.registry());
    let transport_task = tokio::spawn(transport.run(tx, shutdown.subscribe()));
    let ingestion_task = tokio::spawn(monitor.ingestion.clone().run(rx, shutdown.subscribe()));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on port {}", config.port);

    let app = create_app(monitor.app_state(), &config.static_dir);
    let mut http_shutdown = shutdown.subscribe();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signalled(&mut http_shutdown).await })
            .await
    });

    let mut main_shutdown = shutdown.subscribe();
    tokio::select! {
        _ = signalled(&mut main_shutdown) => {}
        result = &mut server => {
            match result {
                Ok(Ok(())) => warn!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => error!("HTTP server error: {}", e),
                Err(e) => error!("HTTP server task failed: {}", e),
            }
            shutdown.trigger();
        }
    }

    // No mutation or append may happen once the store is closed
    if let Err(e) = ingestion_task.await {
        error!("Ingestion task failed: {}", e);
    }
    if let Err(e) = transport_task.await {
        error!("Transport task failed: {}", e);
    }
    monitor.close().await;

    // Observer sockets are long-lived; they are dropped with the runtime
    if !server.is_finished() && tokio::time::timeout(HTTP_DRAIN, &mut server).await.is_err() {
        info!("Closing remaining observer connections");
    }

    info!("✅ Shutdown complete");
    Ok(())
}
