//! Pane layout configuration types.

use serde::{Deserialize, Serialize};

/// Pane layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between panes in pixels (valid range: 0-20).
    pub gap: u32,
    /// Smallest width or height a pane may be dragged to, in pixels
    /// (valid range: 20.0-400.0).
    pub min_pane_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: 4,
            min_pane_size: 80.0,
        }
    }
}
