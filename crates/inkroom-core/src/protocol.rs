//! Wire protocol between whiteboard clients and the relay server.
//!
//! Every frame is a JSON text message tagged by `type`. Clients send
//! `JOIN_ROOM`, `LEAVE_ROOM` and `CHAT`; the server answers a join with
//! `INITIALISE` and relays each chat delta as `ADD`, `REMOVE` or `UPDATE`.

use crate::shapes::Shape;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors decoding or encoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Kind of change carried by a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeltaKind {
    Add,
    Remove,
    Update,
}

/// A batch of shape changes of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(rename = "type")]
    pub kind: DeltaKind,
    pub shapes: Vec<Shape>,
}

impl Delta {
    pub fn new(kind: DeltaKind, shapes: Vec<Shape>) -> Self {
        Self { kind, shapes }
    }

    pub fn add(shapes: Vec<Shape>) -> Self {
        Self::new(DeltaKind::Add, shapes)
    }

    pub fn remove(shapes: Vec<Shape>) -> Self {
        Self::new(DeltaKind::Remove, shapes)
    }

    pub fn update(shapes: Vec<Shape>) -> Self {
        Self::new(DeltaKind::Update, shapes)
    }

    /// Ids of the shapes in this delta.
    pub fn ids(&self) -> HashSet<&str> {
        self.shapes.iter().map(Shape::id).collect()
    }

    /// Merge this delta into a shape list, keyed by id.
    ///
    /// ADD appends, replacing in place any shape that already has the same id.
    /// REMOVE drops matching ids. UPDATE replaces matching ids and ignores
    /// ids that are not present.
    pub fn apply_to(&self, shapes: &mut Vec<Shape>) {
        match self.kind {
            DeltaKind::Add => {
                for incoming in &self.shapes {
                    match shapes.iter_mut().find(|s| s.id() == incoming.id()) {
                        Some(existing) => *existing = incoming.clone(),
                        None => shapes.push(incoming.clone()),
                    }
                }
            }
            DeltaKind::Remove => {
                let ids = self.ids();
                shapes.retain(|s| !ids.contains(s.id()));
            }
            DeltaKind::Update => {
                for shape in shapes.iter_mut() {
                    if let Some(incoming) = self.shapes.iter().find(|s| s.id() == shape.id()) {
                        *shape = incoming.clone();
                    }
                }
            }
        }
    }
}

/// Messages sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Join a room, offering the local shapes to seed a new room.
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(default)]
        shapes: Vec<Shape>,
    },
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// A local edit to relay to the rest of the room.
    Chat {
        #[serde(rename = "roomId")]
        room_id: String,
        delta: Delta,
    },
}

impl ClientMessage {
    pub fn from_json(text: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn room_id(&self) -> &str {
        match self {
            ClientMessage::JoinRoom { room_id, .. }
            | ClientMessage::LeaveRoom { room_id }
            | ClientMessage::Chat { room_id, .. } => room_id,
        }
    }
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Full room state, sent to a member right after it joins.
    Initialise { shapes: Vec<Shape> },
    Add { shapes: Vec<Shape> },
    Remove { shapes: Vec<Shape> },
    Update { shapes: Vec<Shape> },
}

impl ServerMessage {
    pub fn from_json(text: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The relayed delta, or `None` for `INITIALISE`.
    pub fn into_delta(self) -> Option<Delta> {
        match self {
            ServerMessage::Initialise { .. } => None,
            ServerMessage::Add { shapes } => Some(Delta::add(shapes)),
            ServerMessage::Remove { shapes } => Some(Delta::remove(shapes)),
            ServerMessage::Update { shapes } => Some(Delta::update(shapes)),
        }
    }
}

impl From<Delta> for ServerMessage {
    fn from(delta: Delta) -> Self {
        let shapes = delta.shapes;
        match delta.kind {
            DeltaKind::Add => ServerMessage::Add { shapes },
            DeltaKind::Remove => ServerMessage::Remove { shapes },
            DeltaKind::Update => ServerMessage::Update { shapes },
        }
    }
}
