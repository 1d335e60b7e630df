//! SSE snapshot stream handler

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
};

use crate::api::websocket::state::AppState;
use crate::broadcast::SnapshotMessage;

fn traffic_update(msg: &SnapshotMessage) -> Event {
    Event::default()
        .event("traffic_update")
        .id(msg.sequence_id.to_string())
        .data(serde_json::to_string(msg).unwrap_or_default())
}

/// GET /api/stream - SSE stream of snapshot pushes
pub async fn sse_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut rx = state.subscribe();
    let initial = state.sync_message();

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(traffic_update(&initial));

        while let Some(msg) = state.next_push(&mut rx).await {
            yield Ok(traffic_update(&msg));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default().interval(Duration::from_secs(30)))
}
