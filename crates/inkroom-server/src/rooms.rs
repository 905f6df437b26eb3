//! Room registry: membership, canonical shapes and delta fan-out.
//!
//! Every operation holds the room's map entry for its whole duration, so
//! joins, applies and leaves on one room are serialized.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use inkroom_core::protocol::{Delta, ServerMessage};
use inkroom_core::shapes::Shape;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Handle for pushing messages to one socket.
#[derive(Debug, Clone)]
pub struct Connection {
    id: Uuid,
    tx: UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(tx: UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a message. Closed connections are skipped.
    pub fn send(&self, msg: ServerMessage) -> bool {
        if self.tx.is_closed() {
            debug!(connection = %self.id, "Skipping send to closed connection");
            return false;
        }
        self.tx.send(msg).is_ok()
    }
}

#[derive(Debug, Clone)]
struct Member {
    user_id: String,
    connection: Connection,
}

#[derive(Debug)]
struct Room {
    members: Vec<Member>,
    shapes: Vec<Shape>,
}

/// How a join was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist and was seeded from the joiner's shapes.
    Created,
    Joined,
    /// The user was already a member; its connection handle was replaced.
    Rejoined,
}

/// All live rooms, keyed by room id.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: DashMap<String, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user_id` in a room and send it the room's shapes.
    pub fn join(
        &self,
        room_id: &str,
        user_id: &str,
        connection: Connection,
        shapes: Vec<Shape>,
    ) -> JoinOutcome {
        let (mut room, created) = match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) => (entry.into_ref(), false),
            Entry::Vacant(entry) => (
                entry.insert(Room {
                    members: Vec::new(),
                    shapes,
                }),
                true,
            ),
        };

        let outcome = match room.members.iter_mut().find(|m| m.user_id == user_id) {
            Some(member) => {
                // The old socket stays open but no longer receives room traffic.
                warn!(
                    room = room_id,
                    user = user_id,
                    replaced = %member.connection.id(),
                    connection = %connection.id(),
                    "Rejoin replaced an existing connection"
                );
                member.connection = connection.clone();
                JoinOutcome::Rejoined
            }
            None => {
                room.members.push(Member {
                    user_id: user_id.to_string(),
                    connection: connection.clone(),
                });
                if created {
                    JoinOutcome::Created
                } else {
                    JoinOutcome::Joined
                }
            }
        };

        connection.send(ServerMessage::Initialise {
            shapes: room.shapes.clone(),
        });
        info!(
            room = room_id,
            user = user_id,
            members = room.members.len(),
            "{:?}",
            outcome
        );
        outcome
    }

    /// Merge a delta into the room and relay it to every other member.
    ///
    /// Returns how many members it was relayed to, or `None` when the
    /// connection is not a member of the room.
    pub fn apply(&self, room_id: &str, connection_id: Uuid, delta: Delta) -> Option<usize> {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            info!(room = room_id, connection = %connection_id, "Ignoring delta for unknown room");
            return None;
        };
        if !room.members.iter().any(|m| m.connection.id() == connection_id) {
            info!(room = room_id, connection = %connection_id, "Ignoring delta from non-member");
            return None;
        }

        delta.apply_to(&mut room.shapes);
        let msg = ServerMessage::from(delta);
        let relayed = room
            .members
            .iter()
            .filter(|m| m.connection.id() != connection_id)
            .filter(|m| m.connection.send(msg.clone()))
            .count();
        debug!(room = room_id, relayed, "Relayed delta");
        Some(relayed)
    }

    /// Drop the member using `connection_id`; an emptied room is discarded.
    pub fn leave(&self, room_id: &str, connection_id: Uuid) -> bool {
        let removed = match self.rooms.get_mut(room_id) {
            Some(mut room) => {
                let before = room.members.len();
                room.members.retain(|m| m.connection.id() != connection_id);
                before != room.members.len()
            }
            None => false,
        };
        if !removed {
            info!(room = room_id, connection = %connection_id, "Ignoring leave from non-member");
            return false;
        }
        if self
            .rooms
            .remove_if(room_id, |_, room| room.members.is_empty())
            .is_some()
        {
            info!(room = room_id, "Room empty, discarded");
        }
        true
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.members.len())
    }

    /// Snapshot of the room's canonical shapes.
    pub fn shapes(&self, room_id: &str) -> Option<Vec<Shape>> {
        self.rooms.get(room_id).map(|room| room.shapes.clone())
    }
}
