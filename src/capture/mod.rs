//! Audio capture for micwave.
//!
//! Opens the microphone, keeps a bounded window of mono samples, and turns that
//! window into a byte-scaled frequency snapshot once per frame.

pub mod analyser;
pub mod buffer;
pub mod device;
pub mod error;
pub mod microphone;

pub use analyser::{AnalyserSettings, FrequencyAnalyser};
pub use error::CaptureError;
pub use microphone::MicrophoneCapture;

/// Anything that can hand the frame loop its newest mono samples.
pub trait SampleSource {
    /// Replaces the contents of `out` with the current sample window, oldest first.
    fn latest(&self, out: &mut Vec<f32>);
}
