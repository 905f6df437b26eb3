//! Arrow shape.

use super::line::segment_bounds;
use super::{ShapeId, ShapeTrait, TextMetrics, new_shape_id, point_to_segment_dist};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Length of each arrowhead barb in world units.
pub const ARROWHEAD_LENGTH: f64 = 10.0;

/// Angle between the shaft and each barb.
pub const ARROWHEAD_ANGLE: f64 = PI / 6.0;

/// A line segment with an arrowhead at its end point.
///
/// Bounds and hit testing cover the shaft only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Arrow {
    /// Create a new arrow.
    pub fn new(start: Point, end: Point) -> Self {
        Self::with_id(new_shape_id(), start, end)
    }

    /// Create an arrow with a known id.
    pub fn with_id(id: impl Into<ShapeId>, start: Point, end: Point) -> Self {
        Self {
            id: id.into(),
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    /// The point the arrowhead sits on.
    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// The two barb tips of the arrowhead.
    pub fn head_points(&self) -> [Point; 2] {
        let end = self.end();
        let shaft = end - self.start();
        let angle = shaft.y.atan2(shaft.x);
        let barb = |theta: f64| end - Vec2::from_angle(theta) * ARROWHEAD_LENGTH;
        [barb(angle - ARROWHEAD_ANGLE), barb(angle + ARROWHEAD_ANGLE)]
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounds(&self, _metrics: &dyn TextMetrics) -> Rect {
        segment_bounds(self.start(), self.end())
    }

    fn hit_test(&self, point: Point, tolerance: f64, _metrics: &dyn TextMetrics) -> bool {
        point_to_segment_dist(point, self.start(), self.end()) <= tolerance
    }

    fn transform(&mut self, affine: Affine) {
        let start = affine * self.start();
        let end = affine * self.end();
        self.start_x = start.x;
        self.start_y = start.y;
        self.end_x = end.x;
        self.end_y = end.y;
    }
}
