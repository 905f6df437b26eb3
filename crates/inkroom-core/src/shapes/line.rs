//! Line shape.

use super::{ShapeId, ShapeTrait, TextMetrics, new_shape_id, point_to_segment_dist};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self::with_id(new_shape_id(), start, end)
    }

    /// Create a line with a known id.
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

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    pub(crate) fn set_endpoints(&mut self, start: Point, end: Point) {
        self.start_x = start.x;
        self.start_y = start.y;
        self.end_x = end.x;
        self.end_y = end.y;
    }
}

/// Bounds of the box spanned by two endpoints.
pub(crate) fn segment_bounds(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

impl ShapeTrait for Line {
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
        self.set_endpoints(affine * self.start(), affine * self.end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::MonospaceMetrics;

    #[test]
    fn test_line_creation() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(line.start(), Point::new(0.0, 0.0));
        assert_eq!(line.end(), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_hit_test_on_line() {
        let metrics = MonospaceMetrics::default();
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 0.0), 1.0, &metrics));
        assert!(line.hit_test(Point::new(50.0, 2.0), 5.0, &metrics));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 5.0, &metrics));
    }

    #[test]
    fn test_hit_test_is_clamped_to_segment() {
        let metrics = MonospaceMetrics::default();
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(104.0, 0.0), 5.0, &metrics));
        assert!(!line.hit_test(Point::new(110.0, 0.0), 5.0, &metrics));
    }

    #[test]
    fn test_bounds() {
        let line = Line::new(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        let bounds = line.bounds(&MonospaceMetrics::default());
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_names() {
        let line = Line::with_id("l", Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["startX"], 1.0);
        assert_eq!(value["endY"], 4.0);
    }
}
