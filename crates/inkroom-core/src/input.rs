//! Input state management for mouse/touch/keyboard events.

use crate::selection::HandleKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    pub fn from_index(index: i16) -> Option<MouseButton> {
        match index {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// The platform took the pointer away (capture lost, window blur).
    Cancel,
}

/// Wheel or trackpad event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Vec2,
    /// Non-zero on some trackpads during a pinch.
    pub delta_z: f64,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Pinch gestures arrive with Ctrl set or with a z delta.
    pub fn is_pinch(&self) -> bool {
        self.modifiers.ctrl || self.delta_z != 0.0
    }
}

/// Touch event carrying every active touch position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TouchEvent {
    Start(Vec<Point>),
    Move(Vec<Point>),
    End(Vec<Point>),
    Cancel,
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed { key: String, modifiers: Modifiers },
    Released { key: String },
}

/// Any input the canvas reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Wheel(WheelEvent),
    Touch(TouchEvent),
    Key(KeyEvent),
}

/// Cursor the platform should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Crosshair,
    Text,
    Move,
    Grab,
    Grabbing,
    Resize(HandleKind),
}

impl CursorIcon {
    /// CSS cursor keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorIcon::Default => "default",
            CursorIcon::Crosshair => "crosshair",
            CursorIcon::Text => "text",
            CursorIcon::Move => "move",
            CursorIcon::Grab => "grab",
            CursorIcon::Grabbing => "grabbing",
            CursorIcon::Resize(handle) => match handle.compass() {
                "nw" => "nw-resize",
                "n" => "n-resize",
                "ne" => "ne-resize",
                "w" => "w-resize",
                "e" => "e-resize",
                "sw" => "sw-resize",
                "s" => "s-resize",
                _ => "se-resize",
            },
        }
    }
}

/// Platform text entry box used while editing a text shape.
///
/// The canvas opens it at a screen position and reads its content back on commit.
pub trait TextInput {
    /// Show the input at `screen_anchor`, sized for the current viewport scale.
    fn open(&mut self, screen_anchor: Point, scale: f64);

    /// Current text in the input.
    fn content(&self) -> String;

    /// Hide the input and clear its content.
    fn close(&mut self);
}

/// Direction a held key pans the view, in screen units.
pub fn pan_direction(key: &str) -> Option<Vec2> {
    match key {
        "ArrowLeft" | "a" => Some(Vec2::new(-1.0, 0.0)),
        "ArrowRight" | "d" => Some(Vec2::new(1.0, 0.0)),
        "ArrowUp" | "w" => Some(Vec2::new(0.0, -1.0)),
        "ArrowDown" | "s" => Some(Vec2::new(0.0, 1.0)),
        _ => None,
    }
}

/// Single characters are tracked lowercase so Shift does not split a key in two.
pub(crate) fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Tracks which buttons and keys are currently held.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Current modifier keys state.
    pub modifiers: Modifiers,
    pressed_buttons: HashSet<MouseButton>,
    pressed_keys: HashSet<String>,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = *position;
                self.pressed_buttons.insert(*button);
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = *position;
                self.pressed_buttons.remove(button);
            }
            PointerEvent::Move { position } => {
                self.pointer_position = *position;
            }
            PointerEvent::Cancel => {
                self.pressed_buttons.clear();
            }
        }
    }

    /// Process a keyboard event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed { key, modifiers } => {
                self.modifiers = *modifiers;
                self.pressed_keys.insert(normalize_key(key));
            }
            KeyEvent::Released { key } => {
                self.pressed_keys.remove(&normalize_key(key));
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&normalize_key(key))
    }

    /// Sum of the pan directions of every held key.
    pub fn pan_vector(&self) -> Vec2 {
        self.pressed_keys
            .iter()
            .filter_map(|key| pan_direction(key))
            .fold(Vec2::ZERO, |acc, dir| acc + dir)
    }

    /// Forget everything held, for example when the window loses focus.
    pub fn clear(&mut self) {
        self.pressed_buttons.clear();
        self.pressed_keys.clear();
        self.modifiers = Modifiers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut InputState, key: &str) {
        state.handle_key_event(&KeyEvent::Pressed {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        });
    }

    #[test]
    fn test_button_press_and_release() {
        let mut state = InputState::new();
        state.handle_pointer_event(&PointerEvent::Down {
            position: Point::new(10.0, 20.0),
            button: MouseButton::Middle,
        });
        assert!(state.is_button_pressed(MouseButton::Middle));
        assert_eq!(state.pointer_position, Point::new(10.0, 20.0));
        state.handle_pointer_event(&PointerEvent::Up {
            position: Point::new(12.0, 20.0),
            button: MouseButton::Middle,
        });
        assert!(!state.is_button_pressed(MouseButton::Middle));
    }

    #[test]
    fn test_cancel_releases_buttons() {
        let mut state = InputState::new();
        state.handle_pointer_event(&PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Left,
        });
        state.handle_pointer_event(&PointerEvent::Cancel);
        assert!(!state.is_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut state = InputState::new();
        press(&mut state, "W");
        assert!(state.is_key_pressed("w"));
        state.handle_key_event(&KeyEvent::Released { key: "w".into() });
        assert!(!state.is_key_pressed("W"));
    }

    #[test]
    fn test_pan_vector_combines_keys() {
        let mut state = InputState::new();
        press(&mut state, "ArrowRight");
        press(&mut state, "s");
        assert_eq!(state.pan_vector(), Vec2::new(1.0, 1.0));
        // Opposite keys cancel out.
        press(&mut state, "a");
        assert_eq!(state.pan_vector(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_pinch_detection() {
        let mut wheel = WheelEvent {
            position: Point::ZERO,
            delta: Vec2::new(0.0, 10.0),
            delta_z: 0.0,
            modifiers: Modifiers::NONE,
        };
        assert!(!wheel.is_pinch());
        wheel.modifiers = Modifiers::CTRL;
        assert!(wheel.is_pinch());
        wheel.modifiers = Modifiers::NONE;
        wheel.delta_z = 1.0;
        assert!(wheel.is_pinch());
    }

    #[test]
    fn test_mouse_button_indices() {
        assert_eq!(MouseButton::from_index(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_index(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_index(4), None);
    }
}
