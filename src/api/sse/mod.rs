//! SSE (Server-Sent Events) module
//!
//! One-way alternative to the WebSocket channel for observers that only
//! need snapshot pushes.
//!
//! ## Endpoints
//! - `GET /api/stream` - `traffic_update` events (initial sync, then every change)

pub mod handler;

pub use handler::sse_handler;
