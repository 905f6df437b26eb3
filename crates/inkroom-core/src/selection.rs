//! Hit testing, marquee selection and resize handles.

use crate::input::CursorIcon;
use crate::shapes::{Shape, ShapeId, TextMetrics};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default shape hit tolerance in world units.
pub const HIT_TOLERANCE: f64 = 5.0;
/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
}

impl HandleKind {
    /// All handles in drawing order: nw, n, ne, w, e, sw, s, se.
    pub const ALL: [HandleKind; 8] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Edge(Edge::Left),
        HandleKind::Edge(Edge::Right),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Corner(Corner::BottomRight),
    ];

    /// Compass name of the handle.
    pub fn compass(self) -> &'static str {
        match self {
            HandleKind::Corner(Corner::TopLeft) => "nw",
            HandleKind::Edge(Edge::Top) => "n",
            HandleKind::Corner(Corner::TopRight) => "ne",
            HandleKind::Edge(Edge::Left) => "w",
            HandleKind::Edge(Edge::Right) => "e",
            HandleKind::Corner(Corner::BottomLeft) => "sw",
            HandleKind::Edge(Edge::Bottom) => "s",
            HandleKind::Corner(Corner::BottomRight) => "se",
        }
    }

    /// Dragging this handle moves the left edge.
    pub fn moves_left(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(Corner::TopLeft | Corner::BottomLeft) | HandleKind::Edge(Edge::Left)
        )
    }

    /// Dragging this handle moves the right edge.
    pub fn moves_right(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(Corner::TopRight | Corner::BottomRight)
                | HandleKind::Edge(Edge::Right)
        )
    }

    /// Dragging this handle moves the top edge.
    pub fn moves_top(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(Corner::TopLeft | Corner::TopRight) | HandleKind::Edge(Edge::Top)
        )
    }

    /// Dragging this handle moves the bottom edge.
    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            HandleKind::Corner(Corner::BottomLeft | Corner::BottomRight)
                | HandleKind::Edge(Edge::Bottom)
        )
    }

    /// Location of the handle on a bounding box.
    pub fn position(self, bounds: Rect) -> Point {
        let x = if self.moves_left() {
            bounds.x0
        } else if self.moves_right() {
            bounds.x1
        } else {
            bounds.center().x
        };
        let y = if self.moves_top() {
            bounds.y0
        } else if self.moves_bottom() {
            bounds.y1
        } else {
            bounds.center().y
        };
        Point::new(x, y)
    }

    /// Directional resize cursor.
    pub fn cursor(self) -> CursorIcon {
        CursorIcon::Resize(self)
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for viewport scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The eight handles of a selection box.
pub fn get_handles(bounds: Rect) -> [Handle; 8] {
    HandleKind::ALL.map(|kind| Handle::new(kind.position(bounds), kind))
}

/// Nearest handle within `tolerance` of `point`, if any.
pub fn hit_test_handles(bounds: Rect, point: Point, tolerance: f64) -> Option<HandleKind> {
    get_handles(bounds)
        .into_iter()
        .filter(|handle| handle.hit_test(point, tolerance))
        .min_by(|a, b| {
            a.position
                .distance(point)
                .total_cmp(&b.position.distance(point))
        })
        .map(|handle| handle.kind)
}

/// Union of the bounds of every shape, or `None` for an empty set.
pub fn combined_bounds<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    metrics: &dyn TextMetrics,
) -> Option<Rect> {
    shapes
        .into_iter()
        .map(|shape| shape.bounds(metrics))
        .reduce(|acc, bounds| acc.union(bounds))
}

/// The last shape in paint order under `point`.
pub fn topmost_hit<'a>(
    shapes: &'a [Shape],
    point: Point,
    tolerance: f64,
    metrics: &dyn TextMetrics,
) -> Option<&'a Shape> {
    shapes
        .iter()
        .rev()
        .find(|shape| shape.hit_test(point, tolerance, metrics))
}

/// Whether `inner` lies entirely inside `outer`, edges included.
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Ids of shapes whose bounds fall fully inside the box dragged from `a` to `b`.
pub fn shapes_in_marquee(
    shapes: &[Shape],
    a: Point,
    b: Point,
    metrics: &dyn TextMetrics,
) -> Vec<ShapeId> {
    let marquee = Rect::from_points(a, b);
    shapes
        .iter()
        .filter(|shape| contains_rect(marquee, shape.bounds(metrics)))
        .map(|shape| shape.id().to_string())
        .collect()
}
