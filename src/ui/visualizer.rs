//! Full-window terminal surface for the waveform.
//!
//! Owns the terminal for the lifetime of a listening session: paints each frame's
//! strokes across the whole window, overlays the session status on the bottom
//! row while it is visible, and polls the keyboard between frames.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{stdout, Stdout};
use std::time::Duration;

use super::canvas::{geometry_for, render_strokes, Stroke};
use crate::visualizer::{CanvasGeometry, SessionStatus};

/// User input while the visualizer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerCommand {
    /// Keep drawing
    Continue,
    /// Leave the visualizer (q, Escape or Ctrl+C)
    Quit,
}

/// Terminal UI drawing the waveform.
pub struct VisualizerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl VisualizerTui {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Canvas size for the current terminal size. Re-read every frame.
    pub fn canvas_geometry(&self) -> anyhow::Result<CanvasGeometry> {
        let size = self.terminal.size()?;
        Ok(geometry_for(Rect::new(0, 0, size.width, size.height)))
    }

    /// Draws one frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, strokes: &[Stroke], status: Option<&SessionStatus>) -> anyhow::Result<()> {
        self.terminal.draw(|frame| draw_frame(frame, strokes, status))?;
        Ok(())
    }

    /// Waits up to `timeout` for a key and maps it to a command.
    ///
    /// The wait doubles as the frame pacing.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, timeout: Duration) -> anyhow::Result<VisualizerCommand> {
        if !event::poll(timeout)? {
            return Ok(VisualizerCommand::Continue);
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(VisualizerCommand::Continue);
            }
            return Ok(match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    tracing::debug!("Escape or 'q' pressed: leaving visualizer");
                    VisualizerCommand::Quit
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    tracing::debug!("Ctrl+C pressed: leaving visualizer");
                    VisualizerCommand::Quit
                }
                _ => VisualizerCommand::Continue,
            });
        }

        Ok(VisualizerCommand::Continue)
    }

    /// Restores the terminal. Safe to call more than once.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the alternate screen cannot be left
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for VisualizerTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Lays out one frame: waveform across the whole area, status on the last row.
pub fn draw_frame(frame: &mut Frame, strokes: &[Stroke], status: Option<&SessionStatus>) {
    let area = frame.area();
    render_strokes(frame, area, strokes);

    if let Some(status) = status {
        let style = if status.is_error() {
            Style::default().fg(Color::Rgb(255, 85, 85))
        } else {
            Style::default().fg(Color::Rgb(185, 207, 212))
        };

        let footer_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(1),
            width: area.width,
            height: area.height.min(1),
        };

        let footer = Paragraph::new(status.message())
            .alignment(Alignment::Center)
            .style(style.bg(Color::Rgb(0, 0, 0)));
        frame.render_widget(footer, footer_area);
    }
}
