//! History endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::websocket::state::AppState;
use crate::error::MonitorError;
use crate::types::{HistoricalBucket, Period};

/// Query parameters for history
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// `second`, `minute` or `hour`; only an absent value defaults
    pub period: Option<String>,
}

/// GET /api/history - Bucketed counts per traffic level
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoricalBucket>>, MonitorError> {
    let period = match params.period.as_deref() {
        None => Period::DEFAULT,
        Some(raw) => Period::parse(raw)?,
    };

    let buckets = state.history.query(period).await?;
    Ok(Json(buckets))
}
