//! WebSocket client for collaboration.
//!
//! Provides the transport seam used by [`crate::collaboration::SyncClient`]
//! and a native implementation on top of tungstenite.

use crate::protocol::{Delta, ServerMessage};
use crate::shapes::Shape;
use thiserror::Error;

/// Errors from the WebSocket client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid WebSocket URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("connection thread has stopped")]
    ChannelClosed,
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from the WebSocket client
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Connected to server
    Connected,
    /// Disconnected from server
    Disconnected,
    /// Full room state after a join
    Initialised { shapes: Vec<Shape> },
    /// A delta relayed from another member
    DeltaReceived(Delta),
    /// Error occurred
    Error { message: String },
}

impl From<ServerMessage> for SyncEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Initialise { shapes } => SyncEvent::Initialised { shapes },
            ServerMessage::Add { shapes } => SyncEvent::DeltaReceived(Delta::add(shapes)),
            ServerMessage::Remove { shapes } => SyncEvent::DeltaReceived(Delta::remove(shapes)),
            ServerMessage::Update { shapes } => SyncEvent::DeltaReceived(Delta::update(shapes)),
        }
    }
}

/// Decode a server frame, logging and dropping anything malformed.
pub fn decode_server_frame(text: &str) -> Option<SyncEvent> {
    match ServerMessage::from_json(text) {
        Ok(msg) => Some(msg.into()),
        Err(e) => {
            log::warn!("Dropping server message: {}", e);
            None
        }
    }
}

/// Something that can carry text frames to the server.
pub trait Transport {
    fn is_connected(&self) -> bool;

    fn send(&self, msg: &str) -> Result<(), TransportError>;
}

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use std::io::ErrorKind;
    use std::net::TcpStream;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::stream::MaybeTlsStream;
    use tungstenite::{Message, WebSocket, connect};
    use url::Url;

    type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

    /// Read timeout on the socket, bounding how long queued sends wait.
    const READ_POLL: Duration = Duration::from_millis(50);
    const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Build the handshake URL, carrying the session token as `?token=`.
    pub fn ws_url(base: &str, token: &str) -> Result<Url, TransportError> {
        let mut url = Url::parse(base).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
        }
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client for native platforms.
    ///
    /// Uses a background thread for non-blocking operation.
    pub struct NativeWebSocket {
        state: ConnectionState,
        events: Vec<SyncEvent>,
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        /// Create a new disconnected WebSocket client.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to a WebSocket server.
        pub fn connect(&mut self, url: &Url) -> Result<(), TransportError> {
            if self.cmd_tx.is_some() {
                return Err(TransportError::AlreadyConnected);
            }
            if url.scheme() != "ws" && url.scheme() != "wss" {
                return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();
            let url = url.to_string();
            let handle = thread::spawn(move || run_socket(&url, &cmd_rx, &event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        /// Disconnect from the server.
        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Poll for pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        SyncEvent::Connected => self.state = ConnectionState::Connected,
                        SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                        SyncEvent::Error { .. } => self.state = ConnectionState::Error,
                        _ => {}
                    }
                    self.events.push(event);
                }
            }

            std::mem::take(&mut self.events)
        }

        /// Get current connection state.
        pub fn state(&self) -> ConnectionState {
            self.state
        }
    }

    impl Transport for NativeWebSocket {
        fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }

        /// Queue a text frame for the socket thread.
        fn send(&self, msg: &str) -> Result<(), TransportError> {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(msg.to_string()))
                    .map_err(|_| TransportError::ChannelClosed),
                None => Err(TransportError::NotConnected),
            }
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }

    /// Socket thread body. Emits `Connected` once the handshake succeeds and
    /// `Disconnected` when the session ends; a failed handshake emits `Error`.
    fn run_socket(url: &str, commands: &Receiver<WsCommand>, events: &Sender<SyncEvent>) {
        log::info!("Opening room socket {}", redact_token(url));
        let mut socket = match connect(url) {
            Ok((socket, response)) => {
                log::debug!("Handshake accepted with status {}", response.status());
                socket
            }
            Err(e) => {
                log::error!("Room socket handshake failed: {}", e);
                let _ = events.send(SyncEvent::Error {
                    message: format!("Connection failed: {}", e),
                });
                return;
            }
        };
        let _ = events.send(SyncEvent::Connected);

        if let MaybeTlsStream::Plain(tcp) = socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(READ_POLL));
            let _ = tcp.set_write_timeout(Some(WRITE_TIMEOUT));
        }

        while forward_commands(&mut socket, commands) && read_frame(&mut socket, events) {}

        log::info!("Room socket closed");
        let _ = events.send(SyncEvent::Disconnected);
    }

    /// Write every queued command. Returns false once the session should end.
    fn forward_commands(socket: &mut Socket, commands: &Receiver<WsCommand>) -> bool {
        loop {
            match commands.try_recv() {
                Ok(WsCommand::Send(text)) => {
                    if let Err(e) = socket.send(Message::Text(text)) {
                        log::error!("Room socket write failed: {}", e);
                        return false;
                    }
                }
                Ok(WsCommand::Close) => {
                    let _ = socket.close(None);
                    return false;
                }
                // The owning client was dropped.
                Err(TryRecvError::Disconnected) => return false,
                Err(TryRecvError::Empty) => return true,
            }
        }
    }

    /// Wait up to `READ_POLL` for one frame. Returns false once the session should end.
    fn read_frame(socket: &mut Socket, events: &Sender<SyncEvent>) -> bool {
        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(event) = decode_server_frame(&text) {
                    let _ = events.send(event);
                }
                true
            }
            Ok(Message::Close(frame)) => {
                log::debug!("Server closed the room socket: {:?}", frame);
                false
            }
            // Pongs are queued by tungstenite and written on the next send or read.
            Ok(_) => true,
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                true
            }
            Err(e) => {
                log::error!("Room socket read failed: {}", e);
                false
            }
        }
    }

    /// Strip the token query from a URL for logging.
    fn redact_token(url: &str) -> &str {
        url.split_once('?').map_or(url, |(base, _)| base)
    }

}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::{NativeWebSocket, ws_url};

/// Platform-specific WebSocket client type.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;
