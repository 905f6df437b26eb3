//! Viewport module for pan/zoom transforms.

use crate::render::Surface;
use crate::selection::combined_bounds;
use crate::shapes::{Shape, TextMetrics};
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Minimum allowed scale.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum allowed scale.
pub const MAX_SCALE: f64 = 5.0;
/// Exponential sensitivity of wheel and pinch zoom.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.015;
/// Keyboard zoom-in factor (Ctrl + '+').
pub const KEY_ZOOM_IN: f64 = 1.2;
/// Keyboard zoom-out factor (Ctrl + '-').
pub const KEY_ZOOM_OUT: f64 = 0.8;
/// Step used by the zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 1.2;
/// World-space padding around content when fitting.
pub const FIT_PADDING: f64 = 50.0;

/// Maps between screen space and the infinite world plane.
///
/// `offset` is the world coordinate shown at the screen origin, so
/// `screen = (world - offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    offset: Vec2,
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport at the origin with scale 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with the given offset and scale (clamped).
    pub fn with_offset_scale(offset: Vec2, scale: f64) -> Self {
        Self {
            offset,
            scale: clamp_scale(scale),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale as a whole percentage for display.
    pub fn zoom_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            screen_point.x / self.scale + self.offset.x,
            screen_point.y / self.scale + self.offset.y,
        )
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            (world_point.x - self.offset.x) * self.scale,
            (world_point.y - self.offset.y) * self.scale,
        )
    }

    /// Push the world to screen transform onto a surface.
    ///
    /// Scale is applied before the translation so the offset stays in world units.
    pub fn apply_transform(&self, surface: &mut dyn Surface) {
        surface.scale(self.scale);
        surface.translate(-self.offset);
    }

    /// Set a new scale while keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, new_scale: f64) {
        let world_anchor = self.screen_to_world(anchor);
        self.scale = clamp_scale(new_scale);
        self.offset = world_anchor.to_vec2() - anchor.to_vec2() / self.scale;
    }

    /// Multiply the scale by `factor` around `anchor`.
    pub fn zoom_by(&mut self, anchor: Point, factor: f64) {
        self.zoom_at(anchor, self.scale * factor);
    }

    /// Wheel or pinch zoom at the cursor.
    pub fn wheel_zoom(&mut self, anchor: Point, delta_y: f64) {
        self.zoom_by(anchor, (-delta_y * WHEEL_ZOOM_SENSITIVITY).exp());
    }

    pub fn key_zoom_in(&mut self, view: Size) {
        self.zoom_by(center_of(view), KEY_ZOOM_IN);
    }

    pub fn key_zoom_out(&mut self, view: Size) {
        self.zoom_by(center_of(view), KEY_ZOOM_OUT);
    }

    pub fn step_zoom_in(&mut self, view: Size) {
        self.zoom_by(center_of(view), BUTTON_ZOOM_STEP);
    }

    pub fn step_zoom_out(&mut self, view: Size) {
        self.zoom_by(center_of(view), 1.0 / BUTTON_ZOOM_STEP);
    }

    /// Return to 100% around the view center, keeping position.
    pub fn reset_zoom(&mut self, view: Size) {
        self.zoom_at(center_of(view), 1.0);
    }

    /// Drag pan: content follows the pointer.
    pub fn pan_by_drag(&mut self, screen_delta: Vec2) {
        self.offset -= screen_delta / self.scale;
    }

    /// Drag pan measured from the gesture start.
    pub fn pan_from(&mut self, start_offset: Vec2, total_screen_delta: Vec2) {
        self.offset = start_offset - total_screen_delta / self.scale;
    }

    /// Scroll pan: the view moves in the scroll direction.
    pub fn pan_by_scroll(&mut self, screen_delta: Vec2) {
        self.offset += screen_delta / self.scale;
    }

    /// Reset to the origin at 100%.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit the view to the given world bounds, or reset when there are none.
    pub fn fit_to_bounds(&mut self, bounds: Option<Rect>, view: Size) {
        let Some(bounds) = bounds else {
            self.reset();
            return;
        };
        let padded = Rect::new(
            bounds.x0 - FIT_PADDING,
            bounds.y0 - FIT_PADDING,
            bounds.x1 + FIT_PADDING,
            bounds.y1 + FIT_PADDING,
        );
        let scale = (view.width / padded.width())
            .min(view.height / padded.height())
            .min(1.0);
        self.scale = clamp_scale(scale);
        self.offset = Vec2::new(
            padded.x0 - (view.width / self.scale - padded.width()) / 2.0,
            padded.y0 - (view.height / self.scale - padded.height()) / 2.0,
        );
    }

    /// Fit the view so every shape is visible.
    pub fn fit_to_content(&mut self, shapes: &[Shape], view: Size, metrics: &dyn TextMetrics) {
        self.fit_to_bounds(combined_bounds(shapes.iter(), metrics), view);
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

fn center_of(view: Size) -> Point {
    Point::new(view.width / 2.0, view.height / 2.0)
}
