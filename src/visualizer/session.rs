//! Per-session context tying capture, analysis and the loudness state together.

use std::time::Duration;

use crate::capture::{CaptureError, FrequencyAnalyser, MicrophoneCapture, SampleSource};
use crate::config::{MicwaveConfig, VisualConfig};

use super::pipeline::tick;
use super::volume::LoudnessState;
use super::waveform::{CanvasGeometry, WaveFrame};

/// Everything one capture session owns.
///
/// Created once acquisition succeeds and dropped when the visualizer exits.
/// Restarting capture means building a new session.
pub struct VisualizerSession<S: SampleSource> {
    source: S,
    analyser: FrequencyAnalyser,
    samples: Vec<f32>,
    snapshot: Vec<u8>,
    loudness: LoudnessState,
    sensitivity: f32,
}

impl<S: SampleSource> VisualizerSession<S> {
    pub fn new(source: S, analyser: FrequencyAnalyser, visual: &VisualConfig) -> Self {
        let bins = analyser.bin_count();
        Self {
            source,
            samples: Vec::with_capacity(analyser.settings().fft_size),
            snapshot: vec![0u8; bins],
            analyser,
            loudness: LoudnessState::new(visual.smoothing_decay),
            sensitivity: visual.sensitivity,
        }
    }

    /// Refreshes the snapshot in place and renders the frame for `now`.
    pub fn frame(&mut self, canvas: CanvasGeometry, now: Duration) -> WaveFrame {
        self.source.latest(&mut self.samples);
        self.analyser
            .fill_byte_frequency_data(&self.samples, &mut self.snapshot);

        let (loudness, frame) = tick(&self.snapshot, self.loudness, self.sensitivity, canvas, now);
        self.loudness = loudness;
        frame
    }

    /// Current smoothed loudness in `[0, 255]`.
    pub fn loudness(&self) -> f32 {
        self.loudness.value()
    }
}

impl VisualizerSession<MicrophoneCapture> {
    /// Acquires the configured microphone and builds the session around it.
    ///
    /// # Errors
    /// - If the analyser settings are invalid
    /// - If the microphone cannot be opened
    pub async fn acquire(config: &MicwaveConfig) -> Result<Self, CaptureError> {
        let analyser = FrequencyAnalyser::new(config.audio.analyser.clone())?;
        let capture =
            MicrophoneCapture::acquire(&config.audio.device, analyser.settings().fft_size).await?;

        tracing::info!(
            "Session started: device={}, {}Hz, {} bins, sensitivity={}",
            capture.device_name(),
            capture.sample_rate(),
            analyser.bin_count(),
            config.visual.sensitivity
        );

        Ok(Self::new(capture, analyser, &config.visual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::AnalyserSettings;
    use crate::visualizer::waveform::RenderState;
    use std::f32::consts::PI;

    struct FixedSource(Vec<f32>);

    impl SampleSource for FixedSource {
        fn latest(&self, out: &mut Vec<f32>) {
            out.clear();
            out.extend_from_slice(&self.0);
        }
    }

    fn session(samples: Vec<f32>) -> VisualizerSession<FixedSource> {
        let analyser = FrequencyAnalyser::new(AnalyserSettings::default()).unwrap();
        VisualizerSession::new(FixedSource(samples), analyser, &VisualConfig::default())
    }

    const CANVAS: CanvasGeometry = CanvasGeometry {
        width: 200.0,
        height: 100.0,
    };

    #[test]
    fn test_silent_source_stays_idle() {
        let mut session = session(vec![0.0; 256]);
        for ms in 0..30 {
            let frame = session.frame(CANVAS, Duration::from_millis(ms * 16));
            assert_eq!(frame.state, RenderState::Idle);
        }
        assert_eq!(session.loudness(), 0.0);
    }

    #[test]
    fn test_loud_tone_becomes_active() {
        let tone: Vec<f32> = (0..256)
            .map(|n| 0.8 * (2.0 * PI * 16.0 * n as f32 / 256.0).sin())
            .collect();
        let mut session = session(tone);

        let mut last = None;
        for ms in 0..60 {
            last = Some(session.frame(CANVAS, Duration::from_millis(ms * 16)));
        }

        assert!(session.loudness() >= 10.0);
        assert_eq!(last.unwrap().state, RenderState::Active);
    }
}
