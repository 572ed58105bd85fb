//! `sightline.toml` loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sightline_core::OverlayConfig;
use tracing::{info, warn};

/// Default config file name
pub const CONFIG_FILE: &str = "sightline.toml";

pub fn load_config(path: &Path) -> Result<OverlayConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the config, or fall back to defaults when it is missing or invalid.
pub fn load_config_or_default(path: &Path) -> OverlayConfig {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return OverlayConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{:#}, using defaults", e);
            OverlayConfig::default()
        }
    }
}
