//! Configuration management for micwave.
//!
//! Loads and saves the TOML configuration file from the user's config directory.
//! Every key is optional; missing keys fall back to the built-in defaults.

pub mod file;

pub use file::{get_config_path, MicwaveConfig, VisualConfig};
