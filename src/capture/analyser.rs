//! Byte-scaled frequency analysis of the live sample window.
//!
//! Produces the per-frame frequency snapshot: one magnitude per bin, windowed
//! with a Blackman window, smoothed over time, converted to decibels and mapped
//! linearly from `[min_decibels, max_decibels]` onto `0..=255`.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::sync::Arc;

use super::CaptureError;

const BLACKMAN_A0: f32 = 0.42;
const BLACKMAN_A1: f32 = 0.5;
const BLACKMAN_A2: f32 = 0.08;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

/// Tunables for the frequency analyser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyserSettings {
    /// Analysis window length in samples; a power of two
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    /// Share of the previous magnitude kept per analysis (0.0 - 1.0)
    #[serde(default = "default_smoothing_time_constant")]
    pub smoothing_time_constant: f32,
    /// Magnitude in dB mapped to byte 0
    #[serde(default = "default_min_decibels")]
    pub min_decibels: f32,
    /// Magnitude in dB mapped to byte 255
    #[serde(default = "default_max_decibels")]
    pub max_decibels: f32,
}

fn default_fft_size() -> usize {
    256
}

fn default_smoothing_time_constant() -> f32 {
    0.8
}

fn default_min_decibels() -> f32 {
    -100.0
}

fn default_max_decibels() -> f32 {
    -30.0
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing_time_constant: default_smoothing_time_constant(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
        }
    }
}

impl AnalyserSettings {
    /// Checks the settings before any stream is opened.
    ///
    /// # Errors
    /// - If `fft_size` is not a power of two in 32..=32768
    /// - If `smoothing_time_constant` is outside 0..=1
    /// - If `min_decibels` is not below `max_decibels`
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(CaptureError::InvalidSettings(format!(
                "fft_size must be a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(CaptureError::InvalidSettings(format!(
                "smoothing_time_constant must be between 0 and 1, got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(CaptureError::InvalidSettings(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }

    /// Number of frequency bins in a snapshot.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Stateful analyser holding the FFT plan, window and smoothed magnitudes.
pub struct FrequencyAnalyser {
    settings: AnalyserSettings,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    /// Creates an analyser for validated settings.
    ///
    /// # Errors
    /// - If the settings fail validation
    pub fn new(settings: AnalyserSettings) -> Result<Self, CaptureError> {
        settings.validate()?;

        let size = settings.fft_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(size);
        let window = (0..size)
            .map(|n| {
                let phase = 2.0 * PI * n as f32 / size as f32;
                BLACKMAN_A0 - BLACKMAN_A1 * phase.cos() + BLACKMAN_A2 * (2.0 * phase).cos()
            })
            .collect();

        Ok(Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; settings.bin_count()],
            settings,
        })
    }

    pub fn settings(&self) -> &AnalyserSettings {
        &self.settings
    }

    pub fn bin_count(&self) -> usize {
        self.settings.bin_count()
    }

    /// Analyses the newest `fft_size` samples and writes byte magnitudes into `out`.
    ///
    /// Shorter input is zero-padded at the front. At most `bin_count()` bytes of
    /// `out` are written.
    pub fn fill_byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        let size = self.settings.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let pad = size - recent.len();

        for (idx, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if idx < pad { 0.0 } else { recent[idx - pad] };
            *slot = Complex::new(sample * self.window[idx], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.settings.smoothing_time_constant;
        let min_db = self.settings.min_decibels;
        let db_range = self.settings.max_decibels - min_db;

        for ((smoothed, bin), byte) in self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .zip(out.iter_mut())
        {
            let magnitude = bin.norm() / size as f32;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            *byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (255.0 * (db - min_db) / db_range).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }
}
