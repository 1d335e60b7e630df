//! API module for HTTP, WebSocket and SSE endpoints
//!
//! Thin surfaces over the snapshot store and the historical aggregator.

pub mod http;
pub mod rest;
pub mod sse;
pub mod websocket;

pub use http::{create_app, create_router};
pub use websocket::AppState;
