//! Text shape and text measurement.

use super::{ShapeId, ShapeTrait, inflate, new_shape_id, rect_contains_inclusive};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Font size used for committed text, in world units.
pub const FONT_SIZE: f64 = 16.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Measures rendered text. Supplied by the platform.
pub trait TextMetrics {
    /// Size of the laid-out block: widest line by line count times line height.
    fn measure(&self, content: &str) -> Size;

    /// Vertical distance between consecutive lines.
    fn line_height(&self) -> f64;
}

/// Fixed-advance metrics, for headless use and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Horizontal advance of a single glyph.
    pub advance: f64,
    /// Distance between baselines.
    pub line_height: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: FONT_SIZE * 0.6,
            line_height: FONT_SIZE * LINE_HEIGHT,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, content: &str) -> Size {
        let lines: Vec<&str> = content.split('\n').collect();
        let widest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        Size::new(
            widest as f64 * self.advance,
            lines.len() as f64 * self.line_height,
        )
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}

/// A text block anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub content: String,
}

impl Text {
    /// Create a new text shape.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self::with_id(new_shape_id(), position, content)
    }

    /// Create a text shape with a known id.
    pub fn with_id(id: impl Into<ShapeId>, position: Point, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: position.x,
            y: position.y,
            content: content.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Content split into rendered lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounds(&self, metrics: &dyn TextMetrics) -> Rect {
        Rect::from_origin_size(self.position(), metrics.measure(&self.content))
    }

    fn hit_test(&self, point: Point, tolerance: f64, metrics: &dyn TextMetrics) -> bool {
        rect_contains_inclusive(inflate(self.bounds(metrics), tolerance), point)
    }

    fn transform(&mut self, affine: Affine) {
        let p = affine * self.position();
        self.x = p.x;
        self.y = p.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_uses_widest_line() {
        let metrics = MonospaceMetrics {
            advance: 10.0,
            line_height: 20.0,
        };
        let size = metrics.measure("ab\nabcd\nc");
        assert!((size.width - 40.0).abs() < f64::EPSILON);
        assert!((size.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_extend_right_and_down() {
        let metrics = MonospaceMetrics {
            advance: 10.0,
            line_height: 20.0,
        };
        let text = Text::new(Point::new(5.0, 5.0), "hey");
        assert_eq!(text.bounds(&metrics), Rect::new(5.0, 5.0, 35.0, 25.0));
        assert!(text.hit_test(Point::new(38.0, 28.0), 5.0, &metrics));
        assert!(!text.hit_test(Point::new(41.0, 15.0), 5.0, &metrics));
    }

    #[test]
    fn test_transform_moves_anchor_only() {
        let mut text = Text::new(Point::new(10.0, 10.0), "a");
        text.transform(Affine::new([2.0, 0.0, 0.0, 2.0, 1.0, 1.0]));
        assert_eq!(text.position(), Point::new(21.0, 21.0));
        assert_eq!(text.content, "a");
    }
}
