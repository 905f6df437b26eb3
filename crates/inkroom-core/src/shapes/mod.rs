//! Shape definitions for the whiteboard.

mod arrow;
mod ellipse;
mod freehand;
mod line;
mod rectangle;
mod text;

pub use arrow::{ARROWHEAD_ANGLE, ARROWHEAD_LENGTH, Arrow};
pub use ellipse::Ellipse;
pub use freehand::{Freehand, StrokePoint};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{FONT_SIZE, LINE_HEIGHT, MonospaceMetrics, Text, TextMetrics};

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes. Travels over the wire as a string.
pub type ShapeId = String;

/// Generate a fresh shape id.
pub fn new_shape_id() -> ShapeId {
    Uuid::new_v4().to_string()
}

/// Minimum distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Grow a rect by `tolerance` on every side.
pub(crate) fn inflate(rect: Rect, tolerance: f64) -> Rect {
    Rect::new(
        rect.x0 - tolerance,
        rect.y0 - tolerance,
        rect.x1 + tolerance,
        rect.y1 + tolerance,
    )
}

/// Inclusive point-in-rect test. `Rect::contains` excludes the far edges.
pub(crate) fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &str;

    /// Get the bounding box in world coordinates.
    fn bounds(&self, metrics: &dyn TextMetrics) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64, metrics: &dyn TextMetrics) -> bool;

    /// Apply an axis-aligned transform to the defining coordinates.
    ///
    /// Only translation and per-axis scaling are meaningful; resize and move
    /// never produce rotation or skew.
    fn transform(&mut self, affine: Affine);
}

/// A shape on the canvas.
///
/// Encodes as `{ "type": "rect", "id": ..., ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect(Rectangle),
    Ellipse(Ellipse),
    Line(Line),
    Arrow(Arrow),
    Draw(Freehand),
    Text(Text),
}

impl Shape {
    /// Wire name of the shape kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rect(_) => "rect",
            Shape::Ellipse(_) => "ellipse",
            Shape::Line(_) => "line",
            Shape::Arrow(_) => "arrow",
            Shape::Draw(_) => "draw",
            Shape::Text(_) => "text",
        }
    }

    pub fn id(&self) -> &str {
        self.as_trait().id()
    }

    pub fn bounds(&self, metrics: &dyn TextMetrics) -> Rect {
        self.as_trait().bounds(metrics)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64, metrics: &dyn TextMetrics) -> bool {
        self.as_trait().hit_test(point, tolerance, metrics)
    }

    pub fn transform(&mut self, affine: Affine) {
        self.as_trait_mut().transform(affine);
    }

    /// Move every defining coordinate by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.transform(Affine::translate(delta));
    }

    /// A translated copy of this shape.
    pub fn translated(&self, delta: Vec2) -> Shape {
        let mut shape = self.clone();
        shape.translate(delta);
        shape
    }

    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rect(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Draw(s) => s,
            Shape::Text(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rect(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Draw(s) => s,
            Shape::Text(s) => s,
        }
    }
}

impl From<Rectangle> for Shape {
    fn from(shape: Rectangle) -> Self {
        Shape::Rect(shape)
    }
}

impl From<Ellipse> for Shape {
    fn from(shape: Ellipse) -> Self {
        Shape::Ellipse(shape)
    }
}

impl From<Line> for Shape {
    fn from(shape: Line) -> Self {
        Shape::Line(shape)
    }
}

impl From<Arrow> for Shape {
    fn from(shape: Arrow) -> Self {
        Shape::Arrow(shape)
    }
}

impl From<Freehand> for Shape {
    fn from(shape: Freehand) -> Self {
        Shape::Draw(shape)
    }
}

impl From<Text> for Shape {
    fn from(shape: Text) -> Self {
        Shape::Text(shape)
    }
}
