//! Terminal surfaces: the waveform canvas and the error screen.

pub mod canvas;
pub mod error;
pub mod visualizer;

pub use error::ErrorScreen;
pub use visualizer::{VisualizerCommand, VisualizerTui};
