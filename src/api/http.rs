//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::rest::{alerts, history, status};
use super::sse::sse_handler;
use super::websocket::{handler::ws_handler, state::AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - dashboard may be served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Real-time channel
        .route("/ws", get(ws_handler))
        .route("/api/stream", get(sse_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/status", get(status::get_status))
        .route("/api/history", get(history::get_history))
        .route("/api/alerts", get(alerts::list_alerts))
        .layer(cors)
        .with_state(state)
}

/// Router plus the static dashboard assets as fallback
pub fn create_app(state: Arc<AppState>, static_dir: &str) -> Router {
    create_router(state).fallback_service(ServeDir::new(static_dir))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
