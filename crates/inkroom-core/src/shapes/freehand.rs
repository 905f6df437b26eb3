//! Freehand stroke shape.

use super::{ShapeId, ShapeTrait, TextMetrics, new_shape_id, point_to_segment_dist};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// One sampled pointer position in a stroke.
///
/// `drag` is false for the pointer-down sample and true for every
/// sample taken while the pointer moved with the button held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub drag: bool,
}

impl StrokePoint {
    pub fn new(point: Point, drag: bool) -> Self {
        Self {
            x: point.x,
            y: point.y,
            drag,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A freehand drawn path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    pub points: Vec<StrokePoint>,
}

impl Freehand {
    /// Create a new freehand stroke from its samples.
    pub fn new(points: Vec<StrokePoint>) -> Self {
        Self::with_id(new_shape_id(), points)
    }

    /// Create a stroke with a known id.
    pub fn with_id(id: impl Into<ShapeId>, points: Vec<StrokePoint>) -> Self {
        Self {
            id: id.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample positions without the drag flags.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(StrokePoint::point)
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounds(&self, _metrics: &dyn TextMetrics) -> Rect {
        let mut positions = self.positions();
        let Some(first) = positions.next() else {
            return Rect::ZERO;
        };
        positions.fold(Rect::from_points(first, first), |rect, p| {
            rect.union_pt(p)
        })
    }

    fn hit_test(&self, point: Point, tolerance: f64, _metrics: &dyn TextMetrics) -> bool {
        self.points
            .windows(2)
            .any(|w| point_to_segment_dist(point, w[0].point(), w[1].point()) <= tolerance)
    }

    fn transform(&mut self, affine: Affine) {
        for sample in &mut self.points {
            let p = affine * sample.point();
            sample.x = p.x;
            sample.y = p.y;
        }
    }
}
