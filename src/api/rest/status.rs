//! Status endpoint - current snapshot

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::api::websocket::state::AppState;
use crate::types::TrafficSnapshot;

/// GET /api/status - Same snapshot shape the real-time channel pushes
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<TrafficSnapshot> {
    Json(state.snapshot())
}
