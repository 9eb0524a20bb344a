//! Full-screen error display for failures before the visualizer can start.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(255, 85, 85);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red screen with a centered message, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Shows `message` until a key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| draw_error(frame, message))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Restores the terminal. Safe to call more than once.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
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

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Paints the error message centered on a red background, wrapped to 80% width.
fn draw_error(frame: &mut Frame, message: &str) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(ERROR_BG)), area);

    let text_width = (area.width as u32 * 8 / 10) as u16;
    let text_area = Rect {
        x: area.x + (area.width - text_width) / 2,
        y: area.y + area.height / 2,
        width: text_width,
        height: area.height - area.height / 2,
    };

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(ERROR_FG).bg(ERROR_BG))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, text_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_error_message_is_centered_below_middle() {
        let mut terminal = Terminal::new(TestBackend::new(50, 10)).unwrap();
        terminal
            .draw(|f| draw_error(f, "Error: No audio input device available"))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..50u16)
            .map(|x| buffer[(x, 5u16)].symbol().to_string())
            .collect();
        assert!(row.contains("No audio input"));
        assert_eq!(buffer[(0u16, 0u16)].bg, ERROR_BG);
    }

    #[test]
    fn test_very_wide_terminal_does_not_overflow() {
        let mut terminal = Terminal::new(TestBackend::new(9000, 3)).unwrap();
        terminal
            .draw(|f| draw_error(f, "Error: No audio input device available"))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..9000u16)
            .map(|x| buffer[(x, 1u16)].symbol().to_string())
            .collect();
        assert!(row.contains("No audio input"));
    }
}
