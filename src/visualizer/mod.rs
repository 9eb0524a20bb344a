//! Loudness-reactive waveform visualizer.
//!
//! Each frame the session refreshes its frequency snapshot, reduces it to a
//! smoothed loudness (`volume`), and turns that loudness plus the wall clock into
//! draw commands (`waveform`). `pipeline::tick` is the pure per-frame step.

pub mod pipeline;
pub mod session;
pub mod status;
pub mod volume;
pub mod waveform;

pub use session::VisualizerSession;
pub use status::SessionStatus;
pub use waveform::CanvasGeometry;
