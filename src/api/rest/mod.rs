//! REST API module for HTTP endpoints
//!
//! On-demand equivalents of the real-time channel:
//! - `GET /api/status` - Current snapshot
//! - `GET /api/history?period=` - Historical buckets (default period: minute)
//! - `GET /api/alerts` - Recent alert records

pub mod alerts;
pub mod history;
pub mod status;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::MonitorError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "TIMEOUT".to_string(),
        }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            MonitorError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(e.to_string()),
            ),
            MonitorError::Timeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::timeout("Historical data query timed out"),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Failed to retrieve historical data"),
            ),
        };
        (status, Json(body)).into_response()
    }
}
