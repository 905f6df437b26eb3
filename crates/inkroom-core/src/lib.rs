//! inkroom Core Library
//!
//! Platform-agnostic core of the inkroom whiteboard: shapes, viewport,
//! interaction state machine and the room sync protocol.

pub mod canvas;
pub mod collaboration;
pub mod input;
pub mod protocol;
pub mod render;
pub mod resize;
pub mod selection;
pub mod shapes;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use canvas::{Canvas, InteractionMode, InteractionState};
pub use collaboration::SyncClient;
pub use input::{CursorIcon, InputEvent, InputState, Modifiers, MouseButton, TextInput};
pub use protocol::{ClientMessage, Delta, DeltaKind, ProtocolError, ServerMessage};
pub use render::{Surface, render_scene};
pub use selection::{Handle, HandleKind};
pub use shapes::{Shape, ShapeId, TextMetrics};
pub use sync::{ConnectionState, SyncEvent, Transport, TransportError};
#[cfg(not(target_arch = "wasm32"))]
pub use sync::PlatformWebSocket;
pub use tools::ToolKind;
pub use viewport::Viewport;
