//! Rectangle shape.

use super::{ShapeId, ShapeTrait, TextMetrics, inflate, new_shape_id, rect_contains_inclusive};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: new_shape_id(),
            x: position.x,
            y: position.y,
            width,
            height,
        }
    }

    /// Create a rectangle with a known id.
    pub fn with_id(id: impl Into<ShapeId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle spanning two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = Point::new(a.x.min(b.x), a.y.min(b.y));
        Self::new(min, (b.x - a.x).abs(), (b.y - a.y).abs())
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounds(&self, _metrics: &dyn TextMetrics) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64, _metrics: &dyn TextMetrics) -> bool {
        rect_contains_inclusive(inflate(self.as_rect(), tolerance), point)
    }

    fn transform(&mut self, affine: Affine) {
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        let origin = affine * self.position();
        self.x = origin.x;
        self.y = origin.y;
        self.width *= sx.abs();
        self.height *= sy.abs();
    }
}
