//! Live microphone visualization.
//!
//! Acquires the microphone once, then runs the frame loop until the user quits or
//! the process is asked to terminate. If acquisition fails the loop never starts
//! and the failure is shown on the error screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::MicwaveConfig;
use crate::ui::canvas::paint;
use crate::ui::{ErrorScreen, VisualizerCommand, VisualizerTui};
use crate::visualizer::{SessionStatus, VisualizerSession};

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ListenOptions {
    pub device: Option<String>,
    pub sensitivity: Option<f32>,
}

impl ListenOptions {
    fn apply(self, config: &mut MicwaveConfig) {
        if let Some(device) = self.device {
            config.audio.device = device;
        }
        if let Some(sensitivity) = self.sensitivity {
            config.visual.sensitivity = sensitivity;
        }
    }
}

/// Runs the visualizer.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the microphone cannot be acquired
/// - If the terminal cannot be drawn to
pub async fn handle_listen(options: ListenOptions) -> anyhow::Result<()> {
    tracing::info!("=== micwave visualizer started ===");

    let mut config = match MicwaveConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            show_error(&format!(
                "Configuration Error:\n\n{err}\n\nPlease check ~/.config/micwave/micwave.toml and try again."
            ))?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };
    options.apply(&mut config);

    if let Err(err) = config.visual.validate() {
        tracing::error!("Invalid visual settings: {err}");
        show_error(&format!(
            "Configuration Error:\n\n{err}\n\nPlease check ~/.config/micwave/micwave.toml and the command-line options."
        ))?;
        return Err(anyhow::anyhow!("Configuration error: {err}"));
    }

    tracing::info!(
        "Configuration loaded: device={}, fft_size={}, sensitivity={}, decay={}",
        config.audio.device,
        config.audio.analyser.fft_size,
        config.visual.sensitivity,
        config.visual.smoothing_decay
    );

    let mut tui = VisualizerTui::new()?;
    let status = SessionStatus::Requesting;
    tui.draw(&[], Some(&status))?;

    let mut session = match VisualizerSession::acquire(&config).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!("Failed to acquire microphone: {err}");
            let status = SessionStatus::from_capture_error(&err);
            tui.cleanup()?;
            show_error(&status.message())?;
            return Err(err.into());
        }
    };

    let term = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&term))
            .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;
    }

    let status = SessionStatus::listening(Instant::now());
    let frame_interval = config.visual.frame_interval();
    let dismiss_after = config.visual.status_dismiss_after();
    let mut frame_count = 0u64;

    tracing::debug!("Entering frame loop. Press 'q' or Escape to quit.");

    loop {
        if term.load(Ordering::Relaxed) {
            tracing::info!("Termination signal received");
            break;
        }

        if tui.handle_input(frame_interval)? == VisualizerCommand::Quit {
            break;
        }

        let canvas = tui.canvas_geometry()?;
        let frame = session.frame(canvas, wall_clock());
        let strokes = paint(&frame.commands());

        let visible = status.is_visible(Instant::now(), dismiss_after);
        tui.draw(&strokes, visible.then_some(&status))?;

        frame_count += 1;
        if frame_count % 600 == 0 {
            tracing::debug!(
                "Frame {}: loudness={:.1}, state={:?}",
                frame_count,
                session.loudness(),
                frame.state
            );
        }
    }

    tui.cleanup()?;
    tracing::info!("=== micwave visualizer exited after {} frames ===", frame_count);
    Ok(())
}

/// Time since the Unix epoch; drives the wave phase.
fn wall_clock() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn show_error(message: &str) -> anyhow::Result<()> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()
}
