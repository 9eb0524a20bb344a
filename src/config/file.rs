//! Configuration file management for micwave.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::device::DEFAULT_DEVICE;
use crate::capture::AnalyserSettings;
use crate::visualizer::volume::{DEFAULT_DECAY, DEFAULT_SENSITIVITY};

/// Audio capture and analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `micwave list-devices`
    /// - device name from `micwave list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// FFT size, time smoothing and decibel range of the frequency analyser
    #[serde(flatten)]
    pub analyser: AnalyserSettings,
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            analyser: AnalyserSettings::default(),
        }
    }
}

/// Waveform behaviour and frame pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualConfig {
    /// Multiplier applied to the mean magnitude before smoothing
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Share of the previous loudness kept each frame (0.0 - 1.0)
    #[serde(default = "default_smoothing_decay")]
    pub smoothing_decay: f32,
    /// Delay between frames in milliseconds (16 is roughly 60 Hz)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// How long the "Listening" status stays on screen, in milliseconds
    #[serde(default = "default_status_dismiss_ms")]
    pub status_dismiss_ms: u64,
}

fn default_sensitivity() -> f32 {
    DEFAULT_SENSITIVITY
}

fn default_smoothing_decay() -> f32 {
    DEFAULT_DECAY
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_status_dismiss_ms() -> u64 {
    3000
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            smoothing_decay: default_smoothing_decay(),
            frame_interval_ms: default_frame_interval_ms(),
            status_dismiss_ms: default_status_dismiss_ms(),
        }
    }
}

impl VisualConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn status_dismiss_after(&self) -> Duration {
        Duration::from_millis(self.status_dismiss_ms)
    }

    /// Checks that sensitivity and decay are usable by the loudness smoother.
    ///
    /// # Errors
    /// - If `sensitivity` is not a finite, non-negative number
    /// - If `smoothing_decay` is outside 0.0 - 1.0
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            anyhow::bail!(
                "sensitivity must be a finite number of at least 0, got {}",
                self.sensitivity
            );
        }
        if !(0.0..=1.0).contains(&self.smoothing_decay) {
            anyhow::bail!(
                "smoothing_decay must be between 0 and 1, got {}",
                self.smoothing_decay
            );
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MicwaveConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub visual: VisualConfig,
}

impl MicwaveConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        Self::parse(&config_content)
    }

    /// Parses configuration from TOML text. Missing keys take their defaults.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: MicwaveConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved: {}", config_path.display());
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("micwave");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("micwave.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = MicwaveConfig::parse("").unwrap();
        assert_eq!(config, MicwaveConfig::default());
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.analyser.fft_size, 256);
        assert_eq!(config.visual.sensitivity, 2.0);
        assert_eq!(config.visual.smoothing_decay, 0.7);
        assert_eq!(config.visual.status_dismiss_after(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_sections() {
        let config = MicwaveConfig::parse(
            r#"
            [audio]
            device = "2"
            fft_size = 512
            max_decibels = -20.0

            [visual]
            sensitivity = 3.5
            "#,
        )
        .unwrap();

        assert_eq!(config.audio.device, "2");
        assert_eq!(config.audio.analyser.fft_size, 512);
        assert_eq!(config.audio.analyser.max_decibels, -20.0);
        assert_eq!(config.audio.analyser.min_decibels, -100.0);
        assert_eq!(config.visual.sensitivity, 3.5);
        assert_eq!(config.visual.frame_interval_ms, 16);
    }

    #[test]
    fn test_serialized_defaults_round_trip() {
        let text = toml::to_string_pretty(&MicwaveConfig::default()).unwrap();
        assert!(text.contains("[audio]"));
        assert!(text.contains("fft_size = 256"));
        assert_eq!(MicwaveConfig::parse(&text).unwrap(), MicwaveConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(MicwaveConfig::parse("[visual]\nsensitivity = \"loud\"").is_err());
    }

    #[test]
    fn test_frame_interval_never_zero() {
        let visual = VisualConfig {
            frame_interval_ms: 0,
            ..VisualConfig::default()
        };
        assert_eq!(visual.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_default_visual_settings_are_valid() {
        assert!(VisualConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unusable_sensitivity_is_rejected() {
        for sensitivity in [f32::NAN, f32::INFINITY, -1.0] {
            let visual = VisualConfig {
                sensitivity,
                ..VisualConfig::default()
            };
            assert!(visual.validate().is_err(), "accepted {sensitivity}");
        }
    }

    #[test]
    fn test_out_of_range_decay_is_rejected() {
        for smoothing_decay in [f32::NAN, 1.5, -0.1] {
            let visual = VisualConfig {
                smoothing_decay,
                ..VisualConfig::default()
            };
            assert!(visual.validate().is_err(), "accepted {smoothing_decay}");
        }
    }

    #[test]
    fn test_nan_sensitivity_from_toml_fails_validation() {
        let config = MicwaveConfig::parse("[visual]\nsensitivity = nan").unwrap();
        assert!(config.visual.sensitivity.is_nan());
        assert!(config.visual.validate().is_err());
    }
}
