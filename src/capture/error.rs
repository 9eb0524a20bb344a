//! Capture acquisition failures.

use thiserror::Error;

/// Why the microphone could not be acquired.
///
/// Any of these aborts the session before the render loop starts.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoDevice,

    #[error("Audio input device '{0}' not found. Use 'micwave list-devices' to see available devices")]
    DeviceNotFound(String),

    #[error("Device index {index} is out of range (0-{max})")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid analyser settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Failed to query device configuration: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to open audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Failed to silence audio backend diagnostics: {0}")]
    Io(#[from] std::io::Error),
}
