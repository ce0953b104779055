//! termdeck configuration system.
//!
//! TOML-based configuration for shells, terminal engines, the pane layout,
//! and logging. All sections use serde defaults so partial configs work out
//! of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use termdeck_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{TermdeckConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use termdeck_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a documented default `config.toml` if none exists yet.
pub fn load_config() -> Result<TermdeckConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path and validate it.
pub fn load_config_from(path: &Path) -> Result<TermdeckConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &TermdeckConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
