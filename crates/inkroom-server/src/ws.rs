//! WebSocket handshake and per-connection message loop.

use crate::AppState;
use crate::rooms::Connection;
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use inkroom_core::protocol::{ClientMessage, ServerMessage};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Handshake query string.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

/// WebSocket upgrade handler. The session token is checked before upgrading.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let user_id = params
        .token
        .as_deref()
        .and_then(|token| state.verifier.verify(token));
    let Some(user_id) = user_id else {
        warn!("Rejected handshake with missing or invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection = Connection::new(tx);
    info!(connection = %connection.id(), user = %user_id, "New connection");

    let (mut sender, mut receiver) = socket.split();
    let mut joined: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, &user_id, &connection, &mut joined, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ignore binary and ping/pong
                    Some(Err(e)) => {
                        warn!(connection = %connection.id(), "WebSocket error: {}", e);
                        break;
                    }
                }
            }

            Some(outgoing) = rx.recv() => {
                let json = match outgoing.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode server message: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Cleanup on disconnect
    for room_id in &joined {
        state.rooms.leave(room_id, connection.id());
    }
    info!(connection = %connection.id(), "Connection closed");
}

/// Handle one text frame. Malformed frames are logged and dropped.
fn handle_text(
    state: &AppState,
    user_id: &str,
    connection: &Connection,
    joined: &mut HashSet<String>,
    text: &str,
) {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(connection = %connection.id(), "Dropping invalid message: {}", e);
            return;
        }
    };

    match msg {
        ClientMessage::JoinRoom { room_id, shapes } => {
            state
                .rooms
                .join(&room_id, user_id, connection.clone(), shapes);
            joined.insert(room_id);
        }
        ClientMessage::LeaveRoom { room_id } => {
            if joined.remove(&room_id) {
                state.rooms.leave(&room_id, connection.id());
            } else {
                info!(connection = %connection.id(), room = %room_id, "Ignoring leave for unjoined room");
            }
        }
        ClientMessage::Chat { room_id, delta } => {
            state.rooms.apply(&room_id, connection.id(), delta);
        }
    }
}
