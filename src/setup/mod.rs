//! First-run setup.
//!
//! Writes a config file with every default spelled out so users have something
//! to edit with `micwave config`.

use crate::config::{get_config_path, MicwaveConfig};

/// Creates the default config file if it does not exist yet.
///
/// # Errors
/// - If the config directory cannot be determined or created
/// - If the file cannot be written
pub fn ensure_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if config_path.exists() {
        tracing::debug!("Config file present: {}", config_path.display());
        return Ok(());
    }

    tracing::info!("No config found, writing defaults to {}", config_path.display());
    MicwaveConfig::default().save()
}
