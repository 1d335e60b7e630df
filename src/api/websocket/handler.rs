//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use super::events::{ClientMessage, ServerMessage};
use super::state::AppState;
use crate::error::MonitorError;
use crate::types::Period;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send; false when the client is gone
async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            log::error!("Failed to serialize WebSocket message: {}", e);
            true
        }
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    log::info!("New client connected");

    // Subscribe before the initial sync so no push falls in between
    let mut rx = state.subscribe();

    if !send(&mut socket, &ServerMessage::TrafficUpdate(state.sync_message())).await {
        return; // Client disconnected immediately
    }

    loop {
        tokio::select! {
            push = state.next_push(&mut rx) => {
                let Some(msg) = push else { break };
                if !send(&mut socket, &ServerMessage::TrafficUpdate(msg)).await {
                    break;
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &state).await {
                            break;
                        }
                    }
                    Some(Err(_)) => break, // WebSocket error
                    None => break,         // Client disconnected
                }
            }
        }
    }

    log::info!("Client disconnected");
}

/// Handle a message from the client
/// Returns false if the connection should be closed
async fn handle_client_message(msg: Message, socket: &mut WebSocket, state: &AppState) -> bool {
    match msg {
        Message::Text(text) => {
            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => ServerMessage::Pong,
                Ok(ClientMessage::GetHistoricalData { period }) => {
                    historical_reply(state, &period).await
                }
                Err(e) => ServerMessage::error("invalid_message", e.to_string()),
            };
            send(socket, &reply).await
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true,
        Message::Close(_) => false, // Client requested close
    }
}

/// Answer a history request; invalid periods are rejected, never defaulted
pub(crate) async fn historical_reply(state: &AppState, raw_period: &str) -> ServerMessage {
    let period = match Period::parse(raw_period) {
        Ok(period) => period,
        Err(e) => return ServerMessage::error("invalid_period", e.to_string()),
    };

    match state.history.query(period).await {
        Ok(payload) => ServerMessage::HistoricalData { period, payload },
        Err(MonitorError::Timeout(_)) => {
            ServerMessage::error("timeout", "Historical data query timed out")
        }
        Err(_) => ServerMessage::error("storage", "Failed to retrieve historical data"),
    }
}
