//! Canvas state and the pointer/keyboard interaction state machine.
//!
//! Every input handler runs to completion on `&mut Canvas` and returns the
//! [`Delta`] it committed locally, if any. The caller forwards that delta to
//! the room through [`crate::collaboration::SyncClient`].

use crate::input::{
    CursorIcon, InputEvent, InputState, KeyEvent, Modifiers, MouseButton, PointerEvent, TextInput,
    TouchEvent, WheelEvent, normalize_key, pan_direction,
};
use crate::protocol::Delta;
use crate::resize::resize_selection;
use crate::selection::{
    HANDLE_HIT_TOLERANCE, HIT_TOLERANCE, HandleKind, combined_bounds, hit_test_handles,
    shapes_in_marquee, topmost_hit,
};
use crate::shapes::{Shape, ShapeId, StrokePoint, Text, TextMetrics};
use crate::tools::{ToolKind, create_shape};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};

/// Keyboard pan speed in screen pixels per animation frame.
pub const KEYBOARD_PAN_SPEED: f64 = 20.0;

/// How a pan gesture was started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanGesture {
    /// Mouse drag; the offset is recomputed from the gesture start.
    Pointer {
        button: MouseButton,
        start_screen: Point,
        start_offset: Vec2,
    },
    /// Two-finger drag; panned incrementally by the moving touch center.
    Touch { last_center: Point },
}

/// Discriminant of [`InteractionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Drawing,
    Panning,
    Resizing,
    Moving,
    TextEditing,
}

/// The single gesture a canvas is in. All points are world coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Dragging out a new shape, or a marquee when `tool` is select.
    Drawing {
        tool: ToolKind,
        start: Point,
        current: Point,
        points: Vec<StrokePoint>,
    },
    Panning(PanGesture),
    Resizing {
        handle: HandleKind,
        start: Point,
        current: Point,
        original_bounds: Rect,
        originals: Vec<Shape>,
    },
    Moving {
        start: Point,
        current: Point,
        originals: Vec<Shape>,
    },
    /// The platform text input is open; the anchor is fixed at entry.
    TextEditing { world_anchor: Point },
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        match self {
            InteractionState::Idle => InteractionMode::Idle,
            InteractionState::Drawing { .. } => InteractionMode::Drawing,
            InteractionState::Panning(_) => InteractionMode::Panning,
            InteractionState::Resizing { .. } => InteractionMode::Resizing,
            InteractionState::Moving { .. } => InteractionMode::Moving,
            InteractionState::TextEditing { .. } => InteractionMode::TextEditing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

/// A whiteboard canvas: viewport, local shapes, selection and input handling.
pub struct Canvas {
    viewport: Viewport,
    view_size: Size,
    shapes: Vec<Shape>,
    selection: Vec<ShapeId>,
    tool: ToolKind,
    interaction: InteractionState,
    input: InputState,
    keyboard_pan: bool,
    cursor: CursorIcon,
    metrics: Box<dyn TextMetrics>,
    text_input: Box<dyn TextInput>,
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new(metrics: Box<dyn TextMetrics>, text_input: Box<dyn TextInput>) -> Self {
        Self {
            viewport: Viewport::new(),
            view_size: Size::ZERO,
            shapes: Vec::new(),
            selection: Vec::new(),
            tool: ToolKind::Select,
            interaction: InteractionState::Idle,
            input: InputState::new(),
            keyboard_pan: false,
            cursor: CursorIcon::Default,
            metrics,
            text_input,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// Track the on-screen size of the canvas.
    pub fn set_view_size(&mut self, size: Size) {
        self.view_size = size;
    }

    /// Shapes in paint order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Selected shapes in paint order.
    pub fn selected_shapes(&self) -> Vec<Shape> {
        self.shapes
            .iter()
            .filter(|s| self.is_selected(s.id()))
            .cloned()
            .collect()
    }

    /// Replace the selection, keeping only ids that exist.
    pub fn set_selection(&mut self, ids: Vec<ShapeId>) {
        self.selection = ids;
        self.prune_selection();
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    /// Switch tools. An open text edit is committed; other gestures are dropped.
    pub fn set_tool(&mut self, tool: ToolKind) -> Option<Delta> {
        let committed = self.finish_text();
        if !matches!(self.interaction, InteractionState::Idle) {
            self.interaction = InteractionState::Idle;
        }
        self.tool = tool;
        self.cursor = self.idle_cursor();
        committed
    }

    /// Combined bounds of the selection, if anything is selected.
    pub fn selection_bounds(&self) -> Option<Rect> {
        combined_bounds(
            self.shapes.iter().filter(|s| self.is_selected(s.id())),
            self.metrics.as_ref(),
        )
    }

    /// The shape the current drawing gesture would create.
    pub fn preview_shape(&self) -> Option<Shape> {
        match &self.interaction {
            InteractionState::Drawing {
                tool,
                start,
                current,
                points,
            } => create_shape(*tool, *start, *current, points),
            _ => None,
        }
    }

    /// The marquee rectangle while dragging out a selection.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.interaction {
            InteractionState::Drawing {
                tool: ToolKind::Select,
                start,
                current,
                ..
            } => Some(Rect::from_points(*start, *current)),
            _ => None,
        }
    }

    /// Live transformed copies of the selection during a resize or move.
    pub fn transform_preview(&self) -> Option<Vec<Shape>> {
        match &self.interaction {
            InteractionState::Resizing {
                handle,
                start,
                current,
                original_bounds,
                originals,
            } => {
                let d = *current - *start;
                Some(resize_selection(originals, *original_bounds, *handle, d.x, d.y))
            }
            InteractionState::Moving {
                start,
                current,
                originals,
            } => {
                let d = *current - *start;
                Some(originals.iter().map(|s| s.translated(d)).collect())
            }
            _ => None,
        }
    }

    /// Dispatch any input event.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<Delta> {
        match event {
            InputEvent::Pointer(PointerEvent::Down { position, button }) => {
                self.pointer_down(position, button)
            }
            InputEvent::Pointer(PointerEvent::Move { position }) => {
                self.pointer_move(position);
                None
            }
            InputEvent::Pointer(PointerEvent::Up { position, button }) => {
                self.pointer_up(position, button)
            }
            InputEvent::Pointer(PointerEvent::Cancel) => {
                self.pointer_cancel();
                None
            }
            InputEvent::Wheel(wheel) => {
                self.wheel(&wheel);
                None
            }
            InputEvent::Touch(touch) => self.touch(&touch),
            InputEvent::Key(KeyEvent::Pressed { key, modifiers }) => self.key_down(&key, modifiers),
            InputEvent::Key(KeyEvent::Released { key }) => {
                self.key_up(&key);
                None
            }
        }
    }

    pub fn pointer_down(&mut self, position: Point, button: MouseButton) -> Option<Delta> {
        self.input
            .handle_pointer_event(&PointerEvent::Down { position, button });

        // Pressing anywhere blurs the text input.
        let committed = self.finish_text();

        let pans = matches!(button, MouseButton::Middle | MouseButton::Right)
            || self.input.is_key_pressed(" ");
        if pans {
            self.begin_pan(PanGesture::Pointer {
                button,
                start_screen: position,
                start_offset: self.viewport.offset(),
            });
            return committed;
        }
        if !self.interaction.is_idle() {
            return committed;
        }

        let world = self.viewport.screen_to_world(position);
        match self.tool {
            ToolKind::Select => self.begin_select(world),
            ToolKind::Text => {
                self.text_input.open(position, self.viewport.scale());
                self.interaction = InteractionState::TextEditing {
                    world_anchor: world,
                };
            }
            tool => {
                let points = if tool == ToolKind::Draw {
                    vec![StrokePoint::new(world, false)]
                } else {
                    Vec::new()
                };
                self.interaction = InteractionState::Drawing {
                    tool,
                    start: world,
                    current: world,
                    points,
                };
            }
        }
        committed
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.input
            .handle_pointer_event(&PointerEvent::Move { position });
        let world = self.viewport.screen_to_world(position);
        if self.interaction.is_idle() {
            self.cursor = self.hover_cursor(world);
            return;
        }

        match &mut self.interaction {
            InteractionState::Drawing {
                tool,
                current,
                points,
                ..
            } => {
                *current = world;
                if *tool == ToolKind::Draw {
                    points.push(StrokePoint::new(world, true));
                }
            }
            InteractionState::Panning(PanGesture::Pointer {
                start_screen,
                start_offset,
                ..
            }) => {
                self.viewport
                    .pan_from(*start_offset, position - *start_screen);
            }
            InteractionState::Resizing { current, .. } | InteractionState::Moving { current, .. } => {
                *current = world;
            }
            InteractionState::Idle
            | InteractionState::Panning(PanGesture::Touch { .. })
            | InteractionState::TextEditing { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, position: Point, button: MouseButton) -> Option<Delta> {
        self.input
            .handle_pointer_event(&PointerEvent::Up { position, button });
        let world = self.viewport.screen_to_world(position);

        match self.interaction {
            InteractionState::Panning(PanGesture::Pointer { button: pan_button, .. })
                if pan_button == button =>
            {
                self.end_gesture();
                None
            }
            InteractionState::Drawing { .. }
            | InteractionState::Resizing { .. }
            | InteractionState::Moving { .. }
                if button == MouseButton::Left =>
            {
                let state = std::mem::take(&mut self.interaction);
                let committed = self.finish_gesture(state, world);
                self.cursor = self.hover_cursor(world);
                committed
            }
            _ => None,
        }
    }

    /// Abort the active pointer gesture without committing anything.
    pub fn pointer_cancel(&mut self) {
        self.input.handle_pointer_event(&PointerEvent::Cancel);
        match self.interaction {
            InteractionState::Idle | InteractionState::TextEditing { .. } => {}
            _ => {
                log::debug!("Pointer cancelled during {:?}", self.interaction.mode());
                self.end_gesture();
            }
        }
    }

    pub fn wheel(&mut self, event: &WheelEvent) {
        if event.is_pinch() {
            self.viewport.wheel_zoom(event.position, event.delta.y);
        } else {
            self.viewport.pan_by_scroll(event.delta);
        }
    }

    pub fn touch(&mut self, event: &TouchEvent) -> Option<Delta> {
        match event {
            TouchEvent::Start(touches) | TouchEvent::Move(touches) if touches.len() == 2 => {
                let center = touches[0].midpoint(touches[1]);
                if let InteractionState::Panning(PanGesture::Touch { last_center }) =
                    &mut self.interaction
                {
                    self.viewport.pan_by_drag(center - *last_center);
                    *last_center = center;
                    return None;
                }
                let committed = self.finish_text();
                self.begin_pan(PanGesture::Touch {
                    last_center: center,
                });
                committed
            }
            TouchEvent::End(touches) | TouchEvent::Move(touches) if touches.len() < 2 => {
                self.end_touch_pan();
                None
            }
            TouchEvent::Cancel => {
                self.end_touch_pan();
                None
            }
            _ => None,
        }
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> Option<Delta> {
        if let InteractionState::TextEditing { .. } = self.interaction {
            return match key {
                "Enter" if !modifiers.shift => self.finish_text(),
                "Escape" => {
                    self.cancel_text();
                    None
                }
                _ => None,
            };
        }

        self.input.handle_key_event(&KeyEvent::Pressed {
            key: key.to_string(),
            modifiers,
        });
        if key == " " {
            if self.interaction.is_idle() {
                self.cursor = CursorIcon::Grab;
            }
            return None;
        }
        if !self.interaction.is_idle() {
            return None;
        }

        if modifiers.ctrl || modifiers.meta {
            match key {
                "+" | "=" => self.viewport.key_zoom_in(self.view_size),
                "-" => self.viewport.key_zoom_out(self.view_size),
                _ => {}
            }
            return None;
        }
        if modifiers.alt {
            match normalize_key(key).as_str() {
                "r" => self.viewport.reset(),
                "f" => self.fit_to_content(),
                _ => {}
            }
            return None;
        }
        if pan_direction(&normalize_key(key)).is_some() {
            self.keyboard_pan = true;
            return None;
        }

        match key {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => {
                self.selection.clear();
                None
            }
            _ => None,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.handle_key_event(&KeyEvent::Released {
            key: key.to_string(),
        });
        if key == " " && self.interaction.is_idle() {
            self.cursor = self.idle_cursor();
        }
    }

    /// Whether keyboard panning wants animation frames.
    pub fn needs_animation_frame(&self) -> bool {
        self.keyboard_pan
    }

    /// Advance keyboard panning by one frame.
    ///
    /// Returns whether another frame should be scheduled.
    pub fn animation_frame(&mut self) -> bool {
        if !self.keyboard_pan {
            return false;
        }
        let direction = self.input.pan_vector();
        if direction == Vec2::ZERO || !self.interaction.is_idle() {
            self.keyboard_pan = false;
            return false;
        }
        self.viewport.pan_by_scroll(direction * KEYBOARD_PAN_SPEED);
        true
    }

    /// Text input lost focus.
    pub fn text_blur(&mut self) -> Option<Delta> {
        self.finish_text()
    }

    /// Window lost focus: forget held keys and buttons.
    pub fn focus_lost(&mut self) {
        self.input.clear();
        self.keyboard_pan = false;
        if self.interaction.is_idle() {
            self.cursor = self.idle_cursor();
        }
    }

    pub fn fit_to_content(&mut self) {
        self.viewport
            .fit_to_content(&self.shapes, self.view_size, self.metrics.as_ref());
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.step_zoom_in(self.view_size);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.step_zoom_out(self.view_size);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom(self.view_size);
    }

    /// Remove the selected shapes.
    pub fn delete_selection(&mut self) -> Option<Delta> {
        if self.selection.is_empty() {
            return None;
        }
        let delta = Delta::remove(self.selected_shapes());
        delta.apply_to(&mut self.shapes);
        self.selection.clear();
        Some(delta)
    }

    /// Merge a delta relayed from another member.
    pub fn apply_remote(&mut self, delta: &Delta) {
        delta.apply_to(&mut self.shapes);
        self.prune_selection();
    }

    /// Replace every shape with the room's canonical state.
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        self.prune_selection();
    }

    fn begin_select(&mut self, world: Point) {
        let tolerance = HANDLE_HIT_TOLERANCE / self.viewport.scale();
        if let Some(bounds) = self.selection_bounds() {
            if let Some(handle) = hit_test_handles(bounds, world, tolerance) {
                self.interaction = InteractionState::Resizing {
                    handle,
                    start: world,
                    current: world,
                    original_bounds: bounds,
                    originals: self.selected_shapes(),
                };
                self.cursor = handle.cursor();
                return;
            }
        }

        let hit = topmost_hit(&self.shapes, world, HIT_TOLERANCE, self.metrics.as_ref())
            .map(|s| s.id().to_string());
        if let Some(id) = hit {
            if !self.is_selected(&id) {
                self.selection = vec![id];
            }
            self.interaction = InteractionState::Moving {
                start: world,
                current: world,
                originals: self.selected_shapes(),
            };
            self.cursor = CursorIcon::Move;
            return;
        }

        self.interaction = InteractionState::Drawing {
            tool: ToolKind::Select,
            start: world,
            current: world,
            points: Vec::new(),
        };
    }

    fn begin_pan(&mut self, gesture: PanGesture) {
        if !matches!(
            self.interaction,
            InteractionState::Idle | InteractionState::Panning(_)
        ) {
            log::debug!(
                "Pan interrupted {:?}, abandoning it",
                self.interaction.mode()
            );
        }
        self.interaction = InteractionState::Panning(gesture);
        self.cursor = CursorIcon::Grabbing;
    }

    fn end_touch_pan(&mut self) {
        if let InteractionState::Panning(PanGesture::Touch { .. }) = self.interaction {
            self.end_gesture();
        }
    }

    fn end_gesture(&mut self) {
        self.interaction = InteractionState::Idle;
        self.cursor = self.idle_cursor();
    }

    fn finish_gesture(&mut self, state: InteractionState, world: Point) -> Option<Delta> {
        match state {
            InteractionState::Drawing {
                tool: ToolKind::Select,
                start,
                ..
            } => {
                self.selection = shapes_in_marquee(&self.shapes, start, world, self.metrics.as_ref());
                None
            }
            InteractionState::Drawing {
                tool, start, points, ..
            } => {
                let shape = create_shape(tool, start, world, &points)?;
                self.shapes.push(shape.clone());
                Some(Delta::add(vec![shape]))
            }
            InteractionState::Resizing {
                handle,
                start,
                original_bounds,
                originals,
                ..
            } => {
                let d = world - start;
                if d == Vec2::ZERO {
                    return None;
                }
                let resized = resize_selection(&originals, original_bounds, handle, d.x, d.y);
                self.commit_update(resized)
            }
            InteractionState::Moving {
                start, originals, ..
            } => {
                let d = world - start;
                if d == Vec2::ZERO {
                    return None;
                }
                let moved = originals.iter().map(|s| s.translated(d)).collect();
                self.commit_update(moved)
            }
            other => {
                self.interaction = other;
                None
            }
        }
    }

    fn commit_update(&mut self, shapes: Vec<Shape>) -> Option<Delta> {
        if shapes.is_empty() {
            return None;
        }
        let delta = Delta::update(shapes);
        delta.apply_to(&mut self.shapes);
        Some(delta)
    }

    /// Commit the open text edit, if any.
    fn finish_text(&mut self) -> Option<Delta> {
        let InteractionState::TextEditing { world_anchor } = self.interaction else {
            return None;
        };
        let content = self.text_input.content();
        self.text_input.close();
        self.end_gesture();
        if content.trim().is_empty() {
            return None;
        }
        let shape = Shape::Text(Text::new(world_anchor, content));
        self.shapes.push(shape.clone());
        Some(Delta::add(vec![shape]))
    }

    fn cancel_text(&mut self) {
        self.text_input.close();
        self.end_gesture();
    }

    fn prune_selection(&mut self) {
        let shapes = &self.shapes;
        self.selection
            .retain(|id| shapes.iter().any(|s| s.id() == id));
    }

    fn idle_cursor(&self) -> CursorIcon {
        if self.input.is_key_pressed(" ") {
            CursorIcon::Grab
        } else {
            self.tool.cursor()
        }
    }

    fn hover_cursor(&self, world: Point) -> CursorIcon {
        if self.input.is_key_pressed(" ") {
            return CursorIcon::Grab;
        }
        if self.tool != ToolKind::Select {
            return self.tool.cursor();
        }
        let tolerance = HANDLE_HIT_TOLERANCE / self.viewport.scale();
        if let Some(handle) = self
            .selection_bounds()
            .and_then(|bounds| hit_test_handles(bounds, world, tolerance))
        {
            return handle.cursor();
        }
        if topmost_hit(&self.shapes, world, HIT_TOLERANCE, self.metrics.as_ref()).is_some() {
            return CursorIcon::Move;
        }
        CursorIcon::Default
    }
}
