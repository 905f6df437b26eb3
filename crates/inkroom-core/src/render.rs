//! Drawing surface abstraction and scene construction.
//!
//! `render_scene` walks the canvas and issues drawing commands against a
//! [`Surface`]. Platforms implement the trait over their 2D context.

use crate::canvas::Canvas;
use crate::selection::{HANDLE_SIZE, get_handles};
use crate::shapes::{Shape, StrokePoint};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;

/// Marquee dash length in screen pixels.
pub const MARQUEE_DASH: f64 = 4.0;
/// Selection box dash pattern, in world units.
pub const SELECTION_DASH: [f64; 2] = [5.0, 5.0];

/// A 2D drawing target with a current transform.
pub trait Surface {
    /// Clear the whole surface, ignoring the current transform.
    fn clear(&mut self, size: Size);

    fn save(&mut self);

    fn restore(&mut self);

    fn scale(&mut self, factor: f64);

    fn translate(&mut self, offset: Vec2);

    fn set_line_width(&mut self, width: f64);

    /// An empty pattern draws solid lines.
    fn set_line_dash(&mut self, pattern: &[f64]);

    fn stroke_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect);

    fn stroke_ellipse(&mut self, center: Point, radii: Vec2);

    fn stroke_polyline(&mut self, points: &[Point]);

    /// Fill one line of text with its top-left corner at `origin`.
    fn fill_text(&mut self, origin: Point, content: &str);
}

/// Render the full canvas: committed shapes, live previews and the selection.
pub fn render_scene(surface: &mut dyn Surface, canvas: &Canvas) {
    let viewport = canvas.viewport();
    let scale = viewport.scale();

    surface.clear(canvas.view_size());
    surface.save();
    viewport.apply_transform(surface);
    surface.set_line_width(1.0 / scale);

    // Resize and move previews stand in for their originals.
    let overrides: HashMap<String, Shape> = canvas
        .transform_preview()
        .unwrap_or_default()
        .into_iter()
        .map(|shape| (shape.id().to_string(), shape))
        .collect();

    for shape in canvas.shapes() {
        draw_shape(surface, overrides.get(shape.id()).unwrap_or(shape), canvas);
    }

    if let Some(preview) = canvas.preview_shape() {
        draw_shape(surface, &preview, canvas);
    }

    if let Some(marquee) = canvas.marquee_rect() {
        surface.set_line_dash(&[MARQUEE_DASH / scale]);
        surface.stroke_rect(marquee);
        surface.set_line_dash(&[]);
    }

    let selection_bounds = if overrides.is_empty() {
        canvas.selection_bounds()
    } else {
        overrides
            .values()
            .map(|shape| shape.bounds(canvas.metrics()))
            .reduce(|acc, bounds| acc.union(bounds))
    };
    if let Some(bounds) = selection_bounds {
        draw_selection(surface, bounds, scale);
    }

    surface.restore();
}

/// Stroke a single shape in world coordinates.
pub fn draw_shape(surface: &mut dyn Surface, shape: &Shape, canvas: &Canvas) {
    match shape {
        Shape::Rect(rect) => surface.stroke_rect(rect.as_rect()),
        Shape::Ellipse(ellipse) => surface.stroke_ellipse(ellipse.center(), ellipse.radii()),
        Shape::Line(line) => surface.stroke_polyline(&[line.start(), line.end()]),
        Shape::Arrow(arrow) => {
            let end = arrow.end();
            surface.stroke_polyline(&[arrow.start(), end]);
            for barb in arrow.head_points() {
                surface.stroke_polyline(&[end, barb]);
            }
        }
        Shape::Draw(draw) => {
            for run in stroke_runs(&draw.points) {
                surface.stroke_polyline(&run);
            }
        }
        Shape::Text(text) => {
            let line_height = canvas.metrics().line_height();
            let origin = text.position();
            for (i, line) in text.lines().enumerate() {
                surface.fill_text(origin + Vec2::new(0.0, i as f64 * line_height), line);
            }
        }
    }
}

/// Split freehand samples into connected runs.
///
/// A point with `drag: false` starts a new run, which begins with a one unit
/// dash ending at that point so single taps stay visible.
pub fn stroke_runs(points: &[StrokePoint]) -> Vec<Vec<Point>> {
    let mut runs: Vec<Vec<Point>> = Vec::new();
    for sample in points {
        let p = sample.point();
        if sample.drag {
            if let Some(run) = runs.last_mut() {
                run.push(p);
                continue;
            }
        }
        runs.push(vec![p - Vec2::new(1.0, 0.0), p]);
    }
    runs
}

fn draw_selection(surface: &mut dyn Surface, bounds: Rect, scale: f64) {
    surface.set_line_dash(&SELECTION_DASH);
    surface.stroke_rect(bounds);
    surface.set_line_dash(&[]);

    let half = HANDLE_SIZE / scale / 2.0;
    for handle in get_handles(bounds) {
        let p = handle.position;
        surface.fill_rect(Rect::new(p.x - half, p.y - half, p.x + half, p.y + half));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, TextInput};
    use crate::shapes::{Arrow, MonospaceMetrics, Rectangle, Text, TextMetrics};
    use crate::tools::ToolKind;

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Clear,
        Save,
        Restore,
        Scale(f64),
        Translate(Vec2),
        LineWidth(f64),
        Dash(Vec<f64>),
        StrokeRect(Rect),
        FillRect(Rect),
        StrokeEllipse(Point, Vec2),
        Polyline(Vec<Point>),
        Text(Point, String),
    }

    #[derive(Default)]
    struct Recorder(Vec<Command>);

    impl Surface for Recorder {
        fn clear(&mut self, _size: Size) {
            self.0.push(Command::Clear);
        }
        fn save(&mut self) {
            self.0.push(Command::Save);
        }
        fn restore(&mut self) {
            self.0.push(Command::Restore);
        }
        fn scale(&mut self, factor: f64) {
            self.0.push(Command::Scale(factor));
        }
        fn translate(&mut self, offset: Vec2) {
            self.0.push(Command::Translate(offset));
        }
        fn set_line_width(&mut self, width: f64) {
            self.0.push(Command::LineWidth(width));
        }
        fn set_line_dash(&mut self, pattern: &[f64]) {
            self.0.push(Command::Dash(pattern.to_vec()));
        }
        fn stroke_rect(&mut self, rect: Rect) {
            self.0.push(Command::StrokeRect(rect));
        }
        fn fill_rect(&mut self, rect: Rect) {
            self.0.push(Command::FillRect(rect));
        }
        fn stroke_ellipse(&mut self, center: Point, radii: Vec2) {
            self.0.push(Command::StrokeEllipse(center, radii));
        }
        fn stroke_polyline(&mut self, points: &[Point]) {
            self.0.push(Command::Polyline(points.to_vec()));
        }
        fn fill_text(&mut self, origin: Point, content: &str) {
            self.0.push(Command::Text(origin, content.to_string()));
        }
    }

    struct NoTextInput;

    impl TextInput for NoTextInput {
        fn open(&mut self, _screen_anchor: Point, _scale: f64) {}
        fn content(&self) -> String {
            String::new()
        }
        fn close(&mut self) {}
    }

    fn canvas(shapes: Vec<Shape>) -> Canvas {
        let metrics = MonospaceMetrics {
            advance: 10.0,
            line_height: 20.0,
        };
        let mut canvas = Canvas::new(Box::new(metrics), Box::new(NoTextInput));
        canvas.set_view_size(Size::new(800.0, 600.0));
        canvas.replace_shapes(shapes);
        canvas
    }

    fn render(canvas: &Canvas) -> Vec<Command> {
        let mut recorder = Recorder::default();
        render_scene(&mut recorder, canvas);
        recorder.0
    }

    #[test]
    fn test_transform_applied_before_shapes() {
        let commands = render(&canvas(vec![Shape::Rect(Rectangle::with_id(
            "r", 0.0, 0.0, 10.0, 10.0,
        ))]));
        assert_eq!(
            &commands[..5],
            &[
                Command::Clear,
                Command::Save,
                Command::Scale(1.0),
                Command::Translate(Vec2::ZERO),
                Command::LineWidth(1.0),
            ]
        );
        assert_eq!(commands[5], Command::StrokeRect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(commands.last(), Some(&Command::Restore));
    }

    #[test]
    fn test_arrow_draws_shaft_and_barbs() {
        let arrow = Arrow::with_id("a", Point::new(0.0, 0.0), Point::new(20.0, 0.0));
        let commands = render(&canvas(vec![Shape::Arrow(arrow)]));
        let polylines = commands
            .iter()
            .filter(|c| matches!(c, Command::Polyline(_)))
            .count();
        assert_eq!(polylines, 3);
    }

    #[test]
    fn test_stroke_runs_split_on_pen_lift() {
        let points = [
            StrokePoint::new(Point::new(0.0, 0.0), false),
            StrokePoint::new(Point::new(1.0, 1.0), true),
            StrokePoint::new(Point::new(5.0, 5.0), false),
        ];
        let runs = stroke_runs(&points);
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0],
            [Point::new(-1.0, 0.0), Point::new(0.0, 0.0), Point::new(1.0, 1.0)]
        );
        assert_eq!(runs[1], [Point::new(4.0, 5.0), Point::new(5.0, 5.0)]);
        assert!(stroke_runs(&[]).is_empty());
    }

    #[test]
    fn test_text_draws_each_line() {
        let text = Text::with_id("t", Point::new(5.0, 5.0), "one\ntwo");
        let commands = render(&canvas(vec![Shape::Text(text)]));
        let lines: Vec<_> = commands
            .into_iter()
            .filter(|c| matches!(c, Command::Text(..)))
            .collect();
        assert_eq!(
            lines,
            [
                Command::Text(Point::new(5.0, 5.0), "one".into()),
                Command::Text(Point::new(5.0, 25.0), "two".into()),
            ]
        );
    }

    /// Measures every block as empty but spaces lines 30 apart.
    struct FlatMetrics;

    impl TextMetrics for FlatMetrics {
        fn measure(&self, _content: &str) -> Size {
            Size::ZERO
        }
        fn line_height(&self) -> f64 {
            30.0
        }
    }

    #[test]
    fn test_text_lines_use_metrics_line_height() {
        let mut canvas = Canvas::new(Box::new(FlatMetrics), Box::new(NoTextInput));
        canvas.set_view_size(Size::new(800.0, 600.0));
        canvas.replace_shapes(vec![Shape::Text(Text::with_id(
            "t",
            Point::ZERO,
            "a\nb",
        ))]);
        let commands = render(&canvas);
        assert!(commands.contains(&Command::Text(Point::new(0.0, 30.0), "b".into())));
    }

    #[test]
    fn test_selection_draws_dashed_box_and_handles() {
        let mut canvas = canvas(vec![Shape::Rect(Rectangle::with_id(
            "r", 0.0, 0.0, 100.0, 100.0,
        ))]);
        canvas.set_selection(vec!["r".into()]);
        let commands = render(&canvas);
        assert!(commands.contains(&Command::Dash(SELECTION_DASH.to_vec())));
        let handles = commands
            .iter()
            .filter(|c| matches!(c, Command::FillRect(_)))
            .count();
        assert_eq!(handles, 8);
        assert!(commands.contains(&Command::FillRect(Rect::new(96.0, 96.0, 104.0, 104.0))));
    }

    #[test]
    fn test_marquee_dash_scales_with_zoom() {
        let mut canvas = canvas(vec![]);
        canvas.zoom_in();
        canvas.set_tool(ToolKind::Select);
        canvas.pointer_down(Point::new(10.0, 10.0), MouseButton::Left);
        canvas.pointer_move(Point::new(50.0, 50.0));
        let commands = render(&canvas);
        let scale = canvas.viewport().scale();
        assert!(commands.contains(&Command::Dash(vec![MARQUEE_DASH / scale])));
        assert!(commands.contains(&Command::LineWidth(1.0 / scale)));
    }

    #[test]
    fn test_move_preview_replaces_original() {
        let mut canvas = canvas(vec![Shape::Rect(Rectangle::with_id(
            "r", 0.0, 0.0, 10.0, 10.0,
        ))]);
        canvas.pointer_down(Point::new(5.0, 5.0), MouseButton::Left);
        canvas.pointer_move(Point::new(25.0, 5.0));
        let commands = render(&canvas);
        assert!(commands.contains(&Command::StrokeRect(Rect::new(20.0, 0.0, 30.0, 10.0))));
        assert!(!commands.contains(&Command::StrokeRect(Rect::new(0.0, 0.0, 10.0, 10.0))));
    }
}
