//! Configuration schema types for termdeck.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod layout;
mod shell;
mod system;
mod terminal;

pub use layout::*;
pub use shell::*;
pub use system::*;
pub use terminal::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct TermdeckConfig {
    pub shell: ShellConfig,
    pub terminal: TerminalConfig,
    pub layout: LayoutConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
