//! Ellipse shape.

use super::{ShapeId, ShapeTrait, TextMetrics, new_shape_id};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned ellipse. `x`/`y` is the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: new_shape_id(),
            x: center.x,
            y: center.y,
            radius_x,
            radius_y,
        }
    }

    /// Create an ellipse with a known id.
    pub fn with_id(id: impl Into<ShapeId>, center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: id.into(),
            ..Self::new(center, radius_x, radius_y)
        }
    }

    /// Create an ellipse inscribed in the box spanned by two corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.midpoint(b), (b.x - a.x).abs() / 2.0, (b.y - a.y).abs() / 2.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radii(&self) -> Vec2 {
        Vec2::new(self.radius_x, self.radius_y)
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounds(&self, _metrics: &dyn TextMetrics) -> Rect {
        Rect::new(
            self.x - self.radius_x,
            self.y - self.radius_y,
            self.x + self.radius_x,
            self.y + self.radius_y,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64, _metrics: &dyn TextMetrics) -> bool {
        let rx = self.radius_x + tolerance;
        let ry = self.radius_y + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (point.x - self.x) / rx;
        let dy = (point.y - self.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    fn transform(&mut self, affine: Affine) {
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        let center = affine * self.center();
        self.x = center.x;
        self.y = center.y;
        self.radius_x *= sx.abs();
        self.radius_y *= sy.abs();
    }
}
