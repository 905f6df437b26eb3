//! Multi-shape resize.
//!
//! A resize drags one of the eight handles of the selection box. The box is
//! perturbed by the pointer delta, clamped to a minimum extent, and every
//! selected shape is remapped proportionally from the original box into the
//! new one.

use crate::selection::HandleKind;
use crate::shapes::Shape;
use kurbo::{Affine, Rect};

/// Smallest width or height a resized selection box may have.
pub const MIN_RESIZE_EXTENT: f64 = 10.0;

/// Selection box after dragging `handle` by (`dx`, `dy`) world units.
pub fn calculate_new_bounds(bounds: Rect, handle: HandleKind, dx: f64, dy: f64) -> Rect {
    let mut x = bounds.x0;
    let mut y = bounds.y0;
    let mut width = bounds.width();
    let mut height = bounds.height();

    if handle.moves_left() {
        x += dx;
        width -= dx;
    } else if handle.moves_right() {
        width += dx;
    }
    if handle.moves_top() {
        y += dy;
        height -= dy;
    } else if handle.moves_bottom() {
        height += dy;
    }

    // Keep the opposite edge fixed when the dragged side hits the minimum.
    if width < MIN_RESIZE_EXTENT {
        if handle.moves_left() {
            x -= MIN_RESIZE_EXTENT - width;
        }
        width = MIN_RESIZE_EXTENT;
    }
    if height < MIN_RESIZE_EXTENT {
        if handle.moves_top() {
            y -= MIN_RESIZE_EXTENT - height;
        }
        height = MIN_RESIZE_EXTENT;
    }

    Rect::new(x, y, x + width, y + height)
}

/// Per-axis map taking `original` onto `target`.
///
/// An axis with zero original extent maps to itself.
pub fn remap_transform(original: Rect, target: Rect) -> Affine {
    let (sx, tx) = axis_map(original.x0, original.width(), target.x0, target.width());
    let (sy, ty) = axis_map(original.y0, original.height(), target.y0, target.height());
    Affine::new([sx, 0.0, 0.0, sy, tx, ty])
}

fn axis_map(origin: f64, extent: f64, new_origin: f64, new_extent: f64) -> (f64, f64) {
    if extent.abs() < f64::EPSILON {
        return (1.0, 0.0);
    }
    let scale = new_extent / extent;
    (scale, new_origin - origin * scale)
}

/// Resized copies of `shapes`, which together span `original_bounds`.
///
/// Input shapes are left untouched so this can drive a live preview.
pub fn resize_selection(
    shapes: &[Shape],
    original_bounds: Rect,
    handle: HandleKind,
    dx: f64,
    dy: f64,
) -> Vec<Shape> {
    let target = calculate_new_bounds(original_bounds, handle, dx, dy);
    let affine = remap_transform(original_bounds, target);
    shapes
        .iter()
        .map(|shape| {
            let mut shape = shape.clone();
            shape.transform(affine);
            shape
        })
        .collect()
}
