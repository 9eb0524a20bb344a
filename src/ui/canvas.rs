//! Immediate-mode draw commands replayed onto a ratatui Braille canvas.
//!
//! Canvas units are Braille dots: two per terminal column, four per row. The
//! waveform works in a top-down coordinate space like a 2D canvas, so y is
//! flipped when handing points to ratatui. Thick strokes are drawn as stacked
//! one-dot passes.

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::canvas::{Canvas, Line as CanvasLine},
};

use crate::visualizer::waveform::{CanvasGeometry, DrawCommand, Point};

const DOTS_PER_COLUMN: f64 = 2.0;
const DOTS_PER_ROW: f64 = 4.0;

/// Drawing surface size for a terminal area, in Braille dots.
pub fn geometry_for(area: Rect) -> CanvasGeometry {
    CanvasGeometry::new(
        area.width as f64 * DOTS_PER_COLUMN,
        area.height as f64 * DOTS_PER_ROW,
    )
}

/// A finished, stroked subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub line_width: f64,
    pub color: Color,
}

/// Interprets draw commands the way a 2D canvas context would.
#[derive(Debug)]
pub struct CanvasPainter {
    line_width: f64,
    color: Color,
    subpaths: Vec<Vec<Point>>,
    strokes: Vec<Stroke>,
}

impl Default for CanvasPainter {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            color: Color::White,
            subpaths: Vec::new(),
            strokes: Vec::new(),
        }
    }
}

impl CanvasPainter {
    pub fn apply(&mut self, command: &DrawCommand) {
        match command {
            // The terminal is redrawn from scratch each frame, so any clear drops
            // everything stroked so far.
            DrawCommand::ClearRect { .. } => self.strokes.clear(),
            DrawCommand::SetLineWidth(width) => {
                if width.is_finite() && *width > 0.0 {
                    self.line_width = *width;
                }
            }
            DrawCommand::SetStrokeColor(color) => self.color = *color,
            DrawCommand::BeginPath => self.subpaths.clear(),
            DrawCommand::MoveTo(point) => self.subpaths.push(vec![*point]),
            DrawCommand::LineTo(point) => match self.subpaths.last_mut() {
                Some(subpath) => subpath.push(*point),
                // lineTo on an empty path behaves like moveTo
                None => self.subpaths.push(vec![*point]),
            },
            DrawCommand::Stroke => {
                for subpath in self.subpaths.iter().filter(|s| s.len() >= 2) {
                    self.strokes.push(Stroke {
                        points: subpath.clone(),
                        line_width: self.line_width,
                        color: self.color,
                    });
                }
            }
        }
    }
}

/// Replays a command list and returns the resulting strokes.
pub fn paint(commands: &[DrawCommand]) -> Vec<Stroke> {
    let mut painter = CanvasPainter::default();
    for command in commands {
        painter.apply(command);
    }
    painter.strokes
}

/// Renders strokes full-size into `area` on a black background.
pub fn render_strokes(frame: &mut Frame, area: Rect, strokes: &[Stroke]) {
    let geometry = geometry_for(area);
    let height = geometry.height;

    let canvas = Canvas::default()
        .background_color(Color::Rgb(0, 0, 0))
        .marker(Marker::Braille)
        .x_bounds([0.0, geometry.width])
        .y_bounds([0.0, geometry.height])
        .paint(move |ctx| {
            for stroke in strokes {
                let passes = stroke.line_width.round().max(1.0) as usize;
                for pass in 0..passes {
                    let offset = pass as f64 - (passes - 1) as f64 / 2.0;
                    for pair in stroke.points.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].x,
                            y1: height - (pair[0].y + offset),
                            x2: pair[1].x,
                            y2: height - (pair[1].y + offset),
                            color: stroke.color,
                        });
                    }
                }
            }
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::waveform::{render, SEGMENTS, STROKE_COLOR};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn lit_cells(terminal: &Terminal<TestBackend>) -> Vec<(u16, u16)> {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut lit = Vec::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if buffer[(x, y)].symbol() != " " {
                    lit.push((x, y));
                }
            }
        }
        lit
    }

    #[test]
    fn test_geometry_is_in_braille_dots() {
        let geometry = geometry_for(Rect::new(0, 0, 80, 24));
        assert_eq!(geometry.width, 160.0);
        assert_eq!(geometry.height, 96.0);
    }

    #[test]
    fn test_replay_waveform_commands() {
        let frame = render(CanvasGeometry::new(160.0, 96.0), 255.0, Duration::ZERO);
        let strokes = paint(&frame.commands());

        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points.len(), SEGMENTS + 1);
        assert_eq!(strokes[0].line_width, 8.0);
        assert_eq!(strokes[0].color, STROKE_COLOR);
    }

    #[test]
    fn test_clear_drops_previous_strokes() {
        let mut commands = vec![
            DrawCommand::BeginPath,
            DrawCommand::MoveTo(Point { x: 0.0, y: 0.0 }),
            DrawCommand::LineTo(Point { x: 1.0, y: 1.0 }),
            DrawCommand::Stroke,
        ];
        assert_eq!(paint(&commands).len(), 1);

        commands.push(DrawCommand::ClearRect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        });
        assert!(paint(&commands).is_empty());
    }

    #[test]
    fn test_single_point_path_is_not_stroked() {
        let strokes = paint(&[
            DrawCommand::BeginPath,
            DrawCommand::MoveTo(Point { x: 3.0, y: 3.0 }),
            DrawCommand::Stroke,
        ]);
        assert!(strokes.is_empty());
    }

    #[test]
    fn test_idle_line_lands_on_middle_rows() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let area = Rect::new(0, 0, 40, 10);
        let frame = render(geometry_for(area), 0.0, Duration::ZERO);
        let strokes = paint(&frame.commands());

        terminal
            .draw(|f| render_strokes(f, area, &strokes))
            .unwrap();

        let lit = lit_cells(&terminal);
        assert!(!lit.is_empty());
        // 70% of 40 columns, centered
        assert!(lit.iter().all(|&(x, y)| (5..=35).contains(&x) && (4..=5).contains(&y)));
    }

    #[test]
    fn test_empty_strokes_draw_nothing() {
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|f| render_strokes(f, Rect::new(0, 0, 20, 6), &[]))
            .unwrap();
        assert!(lit_cells(&terminal).is_empty());
    }
}
