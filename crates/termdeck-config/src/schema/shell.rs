//! Shell process configuration types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shell process settings.
///
/// Controls which shell to launch, its arguments, the default working
/// directory for new sessions, extra environment variables, and login
/// shell behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell program path. Empty string means auto-detect from `$SHELL`.
    pub program: String,
    /// Extra arguments passed to the shell.
    pub args: Vec<String>,
    /// Working directory for sessions that don't name one. `None` means the
    /// user's home directory.
    pub working_directory: Option<String>,
    /// Extra environment variables injected into the shell.
    pub env: HashMap<String, String>,
    /// Launch as a login shell (`-l`).
    pub login_shell: bool,
}

impl ShellConfig {
    /// The directory a new session starts in when none is given.
    ///
    /// Falls back to the home directory, then to `.`.
    pub fn default_cwd(&self) -> String {
        if let Some(dir) = self.working_directory.as_deref().filter(|d| !d.is_empty()) {
            return dir.to_string();
        }
        dirs::home_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string())
    }

    /// Configured shell program, or `None` to let the host auto-detect.
    pub fn program(&self) -> Option<&str> {
        Some(self.program.as_str()).filter(|p| !p.is_empty())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            working_directory: None,
            env: HashMap::new(),
            login_shell: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
