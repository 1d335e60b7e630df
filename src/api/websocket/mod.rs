//! WebSocket module for the real-time channel
//!
//! Provides the `/ws` endpoint:
//! - Initial sync with the full current snapshot on connect
//! - Full snapshot push after every accepted sensor message
//! - `get_historical_data` requests answered on the same socket

pub mod events;
pub mod handler;
pub mod state;

pub use events::{ClientMessage, ServerMessage};
pub use state::AppState;
