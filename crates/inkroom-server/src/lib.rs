//! inkroom WebSocket Relay Server
//!
//! Relays shape deltas between the members of a room and keeps each room's
//! canonical shape list so late joiners start from the current state.
//!
//! ## Protocol
//!
//! JSON text frames, tagged by `type`:
//! ```json
//! { "type": "JOIN_ROOM", "roomId": "room-id", "shapes": [] }
//! { "type": "CHAT", "roomId": "room-id", "delta": { "type": "ADD", "shapes": [] } }
//! { "type": "LEAVE_ROOM", "roomId": "room-id" }
//! ```
//! The server answers a join with `INITIALISE` and relays each chat as
//! `ADD`, `REMOVE` or `UPDATE` to every other member.

pub mod auth;
pub mod config;
pub mod error;
pub mod rooms;
pub mod ws;

use auth::TokenVerifier;
use axum::{Router, routing::get};
use rooms::RoomStore;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            rooms: Arc::new(RoomStore::new()),
            verifier: Arc::new(verifier),
        }
    }
}

/// Build the relay router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "inkroom relay server - connect via WebSocket at /ws?token=<token>"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}
