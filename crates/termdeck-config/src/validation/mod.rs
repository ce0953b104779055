//! Full configuration validation.
//!
//! Validates numeric ranges and color formats, collecting every problem into
//! a single `ConfigError`.

mod helpers;
mod terminal;


use crate::schema::TermdeckConfig;
use termdeck_common::ConfigError;

use helpers::{validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TermdeckConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    terminal::validate_terminal(&mut errors, config);
    terminal::validate_theme(&mut errors, config);
    validate_layout(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_layout(errors: &mut Vec<String>, config: &TermdeckConfig) {
    validate_range(errors, "layout.gap", config.layout.gap, 0, 20);
    validate_range_f64(
        errors,
        "layout.min_pane_size",
        config.layout.min_pane_size,
        20.0,
        400.0,
    );
}
