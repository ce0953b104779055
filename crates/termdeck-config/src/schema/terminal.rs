//! Terminal engine configuration types.

use serde::{Deserialize, Serialize};

/// Engine color theme.
///
/// Colors are `#rrggbb` hex strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TerminalTheme {
    pub background: String,
    pub foreground: String,
    pub cursor: String,
    pub selection: String,
    /// Color of the `[Error] ...` line written when a shell fails to start.
    pub error: String,
}

impl Default for TerminalTheme {
    fn default() -> Self {
        Self {
            background: "#1e1e1e".into(),
            foreground: "#d4d4d4".into(),
            cursor: "#aeafad".into(),
            selection: "#264f78".into(),
            error: "#f14c4c".into(),
        }
    }
}

/// Terminal engine settings.
///
/// Controls scrollback depth, the session cap, fit metrics, and the theme
/// every engine instance is created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Number of scrollback lines (valid range: 0-100_000).
    pub scrollback_lines: u32,
    /// Maximum concurrently open terminals (valid range: 1-16).
    pub max_sessions: u32,
    /// Delay between shell creation and the initial resize, in milliseconds
    /// (valid range: 0-5000).
    pub settle_delay_ms: u32,
    /// Width of one character cell in pixels (valid range: 1.0-100.0).
    pub cell_width: f64,
    /// Height of one character cell in pixels (valid range: 1.0-100.0).
    pub cell_height: f64,
    /// Inner padding of a pane in pixels (valid range: 0-40).
    pub padding: u32,
    pub theme: TerminalTheme,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: 10_000,
            max_sessions: 4,
            settle_delay_ms: 50,
            cell_width: 8.0,
            cell_height: 17.0,
            padding: 4,
            theme: TerminalTheme::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
