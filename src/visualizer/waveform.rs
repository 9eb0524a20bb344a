//! Waveform geometry for the loudness line.
//!
//! Turns the smoothed loudness and the wall-clock time into a single polyline,
//! then into immediate-mode draw commands for a 2D canvas. Everything here is
//! recomputed from scratch every frame; canvas size may change between calls.

use ratatui::style::Color;
use std::time::Duration;

use super::volume::MAX_LOUDNESS;

/// Share of the canvas width covered by the line.
const LINE_LENGTH_RATIO: f64 = 0.7;
/// Loudness below which the line is drawn flat.
pub const ACTIVE_THRESHOLD: f64 = 10.0;
/// Number of segments in the active polyline.
pub const SEGMENTS: usize = 150;
/// Wave excursion at full loudness, in canvas units.
const MAX_AMPLITUDE: f64 = 60.0;
/// Breathing excursion of the idle line.
const IDLE_AMPLITUDE: f64 = 2.0;
const BASE_LINE_WIDTH: f64 = 2.0;
const LINE_WIDTH_GAIN: f64 = 6.0;
const MIN_LINE_WIDTH: f64 = 1.0;
/// Spatial frequency divisor: one radian every five segments.
const SPATIAL_DIVISOR: f64 = 5.0;
/// Milliseconds per radian of the traveling phase.
const PHASE_MS_DIVISOR: f64 = 200.0;

/// Stroke color of the line.
pub const STROKE_COLOR: Color = Color::Rgb(255, 255, 255);

/// Size of the drawing surface, read fresh every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub width: f64,
    pub height: f64,
}

impl CanvasGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Render state picked from the loudness on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Near-silence: a flat line breathing slowly up and down
    Idle,
    /// Audible input: a traveling sine wave scaled by loudness
    Active,
}

impl RenderState {
    /// Selects the state for a loudness value. No hysteresis.
    pub fn for_loudness(loudness: f64) -> Self {
        if loudness < ACTIVE_THRESHOLD {
            Self::Idle
        } else {
            Self::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One immediate-mode instruction against a 2D canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    SetLineWidth(f64),
    SetStrokeColor(Color),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Stroke,
}

/// Geometry of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveFrame {
    pub canvas: CanvasGeometry,
    pub state: RenderState,
    pub line_width: f64,
    pub amplitude: f64,
    /// Polyline vertices, left to right
    pub points: Vec<Point>,
}

impl WaveFrame {
    /// Emits the draw commands that paint this frame on a cleared canvas.
    pub fn commands(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.points.len() + 6);
        commands.push(DrawCommand::ClearRect {
            x: 0.0,
            y: 0.0,
            width: self.canvas.width,
            height: self.canvas.height,
        });
        commands.push(DrawCommand::SetLineWidth(self.line_width));
        commands.push(DrawCommand::SetStrokeColor(STROKE_COLOR));
        commands.push(DrawCommand::BeginPath);

        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            commands.push(DrawCommand::MoveTo(*first));
            commands.extend(points.map(|p| DrawCommand::LineTo(*p)));
        }

        commands.push(DrawCommand::Stroke);
        commands
    }
}

/// Stroke thickness for a loudness, never below 1.
pub fn line_width(loudness: f64) -> f64 {
    (BASE_LINE_WIDTH + (loudness / MAX_LOUDNESS as f64) * LINE_WIDTH_GAIN).max(MIN_LINE_WIDTH)
}

/// Wave excursion for a loudness.
pub fn amplitude(loudness: f64) -> f64 {
    (loudness / MAX_LOUDNESS as f64) * MAX_AMPLITUDE
}

/// Builds the waveform for one frame.
///
/// `now` is wall-clock time since the Unix epoch; it only drives the phase.
pub fn render(canvas: CanvasGeometry, loudness: f32, now: Duration) -> WaveFrame {
    let loudness = loudness as f64;

    let line_length = canvas.width * LINE_LENGTH_RATIO;
    let start_x = (canvas.width - line_length) / 2.0;
    let end_x = start_x + line_length;
    let center_y = canvas.height / 2.0;

    let state = RenderState::for_loudness(loudness);
    let amplitude = amplitude(loudness);

    let points = match state {
        RenderState::Idle => {
            let idle_wave = now.as_secs_f64().sin() * IDLE_AMPLITUDE;
            vec![
                Point {
                    x: start_x,
                    y: center_y + idle_wave,
                },
                Point {
                    x: end_x,
                    y: center_y + idle_wave,
                },
            ]
        }
        RenderState::Active => {
            let segment_length = line_length / SEGMENTS as f64;
            let phase = now.as_secs_f64() * 1000.0 / PHASE_MS_DIVISOR;
            (0..=SEGMENTS)
                .map(|i| {
                    let i = i as f64;
                    Point {
                        x: start_x + i * segment_length,
                        y: center_y + (i / SPATIAL_DIVISOR + phase).sin() * amplitude,
                    }
                })
                .collect()
        }
    };

    WaveFrame {
        canvas,
        state,
        line_width: line_width(loudness),
        amplitude,
        points,
    }
}
