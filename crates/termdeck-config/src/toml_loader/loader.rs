//! Core TOML config loading: read from path or platform default.

use crate::schema::TermdeckConfig;
use crate::validation;
use std::path::Path;
use termdeck_common::ConfigError;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. Validation failures are logged
/// here and left to the caller to enforce.
pub fn load_from_path(path: &Path) -> Result<TermdeckConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: TermdeckConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "config has invalid values");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/termdeck/config.toml`
/// On macOS: `~/Library/Application Support/termdeck/config.toml`
///
/// If the file does not exist, writes a documented default and returns
/// defaults.
pub fn load_default() -> Result<TermdeckConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(TermdeckConfig::default())
        }
        Err(e) => Err(e),
    }
}
