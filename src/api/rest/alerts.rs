//! Alerts endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::ApiError;
use crate::api::websocket::state::AppState;

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct AlertParams {
    /// Maximum number of alerts to return (default: 50, max: 500)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /api/alerts - Most recent alerts first
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertParams>,
) -> impl IntoResponse {
    match state.store.recent_alerts(params.limit.min(500)).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => {
            log::error!("Error retrieving alerts: {}", e);
            let error = ApiError::internal("Failed to retrieve alerts");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        }
    }
}
