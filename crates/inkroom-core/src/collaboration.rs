//! Room membership and delta exchange for collaborative editing.
//!
//! [`SyncClient`] bridges the local [`Canvas`] to a relay room. Local edits
//! are applied by the canvas first and then queued here as `CHAT` messages;
//! relayed deltas from other members are merged back into the canvas.

use crate::canvas::Canvas;
use crate::protocol::{ClientMessage, Delta, ServerMessage};
use crate::sync::{SyncEvent, Transport};

/// Client side of one room session.
pub struct SyncClient {
    room_id: String,
    /// Pending outgoing messages (JSON strings).
    outgoing: Vec<String>,
    joined: bool,
    initialised: bool,
}

impl SyncClient {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            outgoing: Vec::new(),
            joined: false,
            initialised: false,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Whether a join has been sent and not yet left.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Whether the room's state has arrived since the last join.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Connection opened: join the room, offering the local shapes.
    pub fn on_open(&mut self, canvas: &Canvas) {
        self.joined = true;
        self.initialised = false;
        self.queue(&ClientMessage::JoinRoom {
            room_id: self.room_id.clone(),
            shapes: canvas.shapes().to_vec(),
        });
    }

    /// Relay a delta the canvas has already applied locally.
    pub fn commit(&mut self, delta: Delta) {
        if !self.joined {
            log::debug!("Not in room {}, keeping {:?} local", self.room_id, delta.kind);
            return;
        }
        self.queue(&ClientMessage::Chat {
            room_id: self.room_id.clone(),
            delta,
        });
    }

    pub fn leave(&mut self) {
        if !self.joined {
            return;
        }
        self.queue(&ClientMessage::LeaveRoom {
            room_id: self.room_id.clone(),
        });
        self.joined = false;
        self.initialised = false;
    }

    /// Handle a raw server frame. Malformed frames are logged and dropped.
    pub fn handle_message(&mut self, json: &str, canvas: &mut Canvas) -> Option<SyncEvent> {
        let msg = match ServerMessage::from_json(json) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Dropping server message: {}", e);
                return None;
            }
        };
        let event = SyncEvent::from(msg);
        self.handle_event(event.clone(), canvas);
        Some(event)
    }

    /// Apply a transport event to the canvas.
    pub fn handle_event(&mut self, event: SyncEvent, canvas: &mut Canvas) {
        match event {
            SyncEvent::Connected => self.on_open(canvas),
            SyncEvent::Disconnected => {
                log::info!("Disconnected from room {}", self.room_id);
                self.joined = false;
                self.initialised = false;
            }
            SyncEvent::Initialised { shapes } => {
                if self.initialised {
                    log::warn!("Ignoring repeated INITIALISE for room {}", self.room_id);
                    return;
                }
                log::info!("Room {} initialised with {} shapes", self.room_id, shapes.len());
                canvas.replace_shapes(shapes);
                self.initialised = true;
            }
            SyncEvent::DeltaReceived(delta) => {
                log::debug!("Remote {:?} of {} shapes", delta.kind, delta.shapes.len());
                canvas.apply_remote(&delta);
            }
            SyncEvent::Error { message } => {
                log::error!("Sync error: {}", message);
            }
        }
    }

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing messages.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Send every queued message over `transport`.
    ///
    /// Messages that cannot be sent are dropped with an error log. Returns
    /// how many were handed to the transport.
    pub fn flush(&mut self, transport: &dyn Transport) -> usize {
        let mut sent = 0;
        for msg in self.take_outgoing() {
            match transport.send(&msg) {
                Ok(()) => sent += 1,
                Err(e) => log::error!("Failed to send to room {}: {}", self.room_id, e),
            }
        }
        sent
    }

    fn queue(&mut self, msg: &ClientMessage) {
        match msg.to_json() {
            Ok(json) => self.outgoing.push(json),
            Err(e) => log::error!("Failed to encode message: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, TextInput};
    use crate::protocol::DeltaKind;
    use crate::shapes::{MonospaceMetrics, Rectangle, Shape};
    use crate::sync::TransportError;
    use crate::tools::ToolKind;
    use kurbo::Point;
    use std::cell::RefCell;

    struct NoTextInput;

    impl TextInput for NoTextInput {
        fn open(&mut self, _screen_anchor: Point, _scale: f64) {}
        fn content(&self) -> String {
            String::new()
        }
        fn close(&mut self) {}
    }

    #[derive(Default)]
    struct FakeTransport {
        connected: bool,
        sent: RefCell<Vec<String>>,
    }

    impl Transport for FakeTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn send(&self, msg: &str) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.sent.borrow_mut().push(msg.to_string());
            Ok(())
        }
    }

    fn canvas() -> Canvas {
        Canvas::new(Box::new(MonospaceMetrics::default()), Box::new(NoTextInput))
    }

    fn rect(id: &str, x: f64) -> Shape {
        Shape::Rect(Rectangle::with_id(id, x, 0.0, 10.0, 10.0))
    }

    fn decode(json: &str) -> ClientMessage {
        ClientMessage::from_json(json).unwrap()
    }

    #[test]
    fn test_open_joins_with_local_snapshot() {
        let mut canvas = canvas();
        canvas.replace_shapes(vec![rect("local", 0.0)]);
        let mut client = SyncClient::new("room-1");
        client.on_open(&canvas);
        let out = client.take_outgoing();
        assert_eq!(
            decode(&out[0]),
            ClientMessage::JoinRoom {
                room_id: "room-1".into(),
                shapes: vec![rect("local", 0.0)],
            }
        );
        assert!(!client.has_outgoing());
    }

    #[test]
    fn test_initialise_replaces_local_state_once() {
        let mut canvas = canvas();
        canvas.replace_shapes(vec![rect("stale", 0.0)]);
        let mut client = SyncClient::new("r");
        client.on_open(&canvas);

        let init = ServerMessage::Initialise {
            shapes: vec![rect("a", 1.0), rect("b", 2.0)],
        };
        client.handle_message(&init.to_json().unwrap(), &mut canvas);
        assert!(client.is_initialised());
        assert_eq!(canvas.shapes(), [rect("a", 1.0), rect("b", 2.0)]);

        let again = ServerMessage::Initialise { shapes: vec![] };
        client.handle_message(&again.to_json().unwrap(), &mut canvas);
        assert_eq!(canvas.shapes().len(), 2);
    }

    #[test]
    fn test_remote_deltas_merge_into_canvas() {
        let mut canvas = canvas();
        let mut client = SyncClient::new("r");
        client.handle_event(
            SyncEvent::Initialised {
                shapes: vec![rect("a", 0.0)],
            },
            &mut canvas,
        );
        client.handle_event(SyncEvent::DeltaReceived(Delta::add(vec![rect("b", 5.0)])), &mut canvas);
        client.handle_event(SyncEvent::DeltaReceived(Delta::update(vec![rect("a", 9.0)])), &mut canvas);
        assert_eq!(canvas.shapes(), [rect("a", 9.0), rect("b", 5.0)]);
        client.handle_event(SyncEvent::DeltaReceived(Delta::remove(vec![rect("a", 9.0)])), &mut canvas);
        assert_eq!(canvas.shapes(), [rect("b", 5.0)]);
    }

    #[test]
    fn test_malformed_message_is_dropped() {
        let mut canvas = canvas();
        canvas.replace_shapes(vec![rect("a", 0.0)]);
        let mut client = SyncClient::new("r");
        assert!(client.handle_message("{oops", &mut canvas).is_none());
        assert!(client.handle_message(r#"{"type":"ADD","shapes":[{"type":"star","id":"s"}]}"#, &mut canvas).is_none());
        assert_eq!(canvas.shapes(), [rect("a", 0.0)]);
    }

    #[test]
    fn test_local_commit_is_relayed_as_chat() {
        let mut canvas = canvas();
        let mut client = SyncClient::new("r");
        client.on_open(&canvas);
        client.take_outgoing();

        canvas.set_tool(ToolKind::Rect);
        canvas.pointer_down(Point::new(0.0, 0.0), MouseButton::Left);
        canvas.pointer_move(Point::new(20.0, 20.0));
        let delta = canvas.pointer_up(Point::new(20.0, 20.0), MouseButton::Left).unwrap();
        client.commit(delta.clone());

        let out = client.take_outgoing();
        assert_eq!(out.len(), 1);
        let ClientMessage::Chat { room_id, delta: sent } = decode(&out[0]) else {
            panic!("expected chat");
        };
        assert_eq!(room_id, "r");
        assert_eq!(sent, delta);
        assert_eq!(sent.kind, DeltaKind::Add);
    }

    #[test]
    fn test_leave_queues_leave_room() {
        let canvas = canvas();
        let mut client = SyncClient::new("r");
        client.leave();
        assert!(!client.has_outgoing());
        client.on_open(&canvas);
        client.leave();
        let out = client.take_outgoing();
        assert_eq!(decode(&out[1]), ClientMessage::LeaveRoom { room_id: "r".into() });
        assert!(!client.is_joined());
        client.commit(Delta::add(vec![rect("late", 0.0)]));
        assert!(!client.has_outgoing());
    }

    #[test]
    fn test_flush_sends_when_connected() {
        let canvas = canvas();
        let mut client = SyncClient::new("r");
        client.on_open(&canvas);
        client.commit(Delta::remove(vec![rect("a", 0.0)]));

        let offline = FakeTransport::default();
        assert_eq!(client.flush(&offline), 0);
        assert!(!client.has_outgoing());

        client.commit(Delta::remove(vec![rect("a", 0.0)]));
        let online = FakeTransport {
            connected: true,
            ..Default::default()
        };
        assert_eq!(client.flush(&online), 1);
        assert!(online.sent.borrow()[0].contains("\"CHAT\""));
    }

    #[test]
    fn test_reconnect_rejoins() {
        let mut canvas = canvas();
        let mut client = SyncClient::new("r");
        client.handle_event(SyncEvent::Connected, &mut canvas);
        client.handle_event(SyncEvent::Initialised { shapes: vec![] }, &mut canvas);
        client.handle_event(SyncEvent::Disconnected, &mut canvas);
        assert!(!client.is_initialised());
        client.take_outgoing();
        client.handle_event(SyncEvent::Connected, &mut canvas);
        assert!(matches!(
            decode(&client.take_outgoing()[0]),
            ClientMessage::JoinRoom { .. }
        ));
    }
}
