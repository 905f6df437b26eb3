//! Tool system for the whiteboard.

use crate::input::CursorIcon;
use crate::shapes::{Arrow, Ellipse, Freehand, Line, Rectangle, Shape, StrokePoint};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Selection, move and resize. Named `""` by toolbars.
    #[default]
    #[serde(rename = "")]
    Select,
    Rect,
    Ellipse,
    Line,
    Arrow,
    Draw,
    Text,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Rect,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Draw,
        ToolKind::Text,
    ];

    /// Toolbar name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "",
            ToolKind::Rect => "rect",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Draw => "draw",
            ToolKind::Text => "text",
        }
    }

    /// Cursor shown while the tool is active and idle.
    pub fn cursor(self) -> CursorIcon {
        match self {
            ToolKind::Select => CursorIcon::Default,
            ToolKind::Text => CursorIcon::Text,
            _ => CursorIcon::Crosshair,
        }
    }
}

/// Build the shape produced by dragging `tool` from `start` to `end`.
///
/// `points` are the samples collected by the freehand tool. Returns `None`
/// for tools that do not draw (select) or that commit elsewhere (text).
pub fn create_shape(
    tool: ToolKind,
    start: Point,
    end: Point,
    points: &[StrokePoint],
) -> Option<Shape> {
    let shape = match tool {
        ToolKind::Rect => Shape::Rect(Rectangle::from_corners(start, end)),
        ToolKind::Ellipse => Shape::Ellipse(Ellipse::from_corners(start, end)),
        ToolKind::Line => Shape::Line(Line::new(start, end)),
        ToolKind::Arrow => Shape::Arrow(Arrow::new(start, end)),
        ToolKind::Draw => Shape::Draw(Freehand::new(points.to_vec())),
        ToolKind::Select | ToolKind::Text => return None,
    };
    Some(shape)
}
