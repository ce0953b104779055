//! Fit metrics: how many character cells fit in a container.
//!
//! @module terminal/size

use termdeck_common::{Rect, TermError};

/// Largest column or row count handed to a PTY.
pub const MAX_DIMENSION: u16 = 500;

// =============================================================================
// SIZE INFO
// =============================================================================

/// Terminal dimensions in both pixel and cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeInfo {
    /// Total width of the terminal area in pixels.
    pub width: f64,
    /// Total height of the terminal area in pixels.
    pub height: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Padding applied on every side, in pixels.
    pub padding: f64,
    columns: u16,
    screen_lines: u16,
}

impl SizeInfo {
    /// Create a SizeInfo from known cell counts.
    pub fn new(columns: u16, screen_lines: u16, cell_width: f64, cell_height: f64) -> Self {
        Self {
            width: f64::from(columns) * cell_width,
            height: f64::from(screen_lines) * cell_height,
            cell_width,
            cell_height,
            padding: 0.0,
            columns,
            screen_lines,
        }
    }

    /// Compute how many cells fit in a pixel area.
    ///
    /// A container with no area cannot be measured and yields
    /// `TermError::Fit`. Otherwise the result is clamped to
    /// `1..=MAX_DIMENSION` in both directions.
    pub fn from_pixels(
        bounds: Rect,
        cell_width: f64,
        cell_height: f64,
        padding: f64,
    ) -> Result<Self, TermError> {
        if bounds.is_empty() {
            return Err(TermError::Fit(format!(
                "container has no area ({}x{})",
                bounds.width, bounds.height
            )));
        }
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return Err(TermError::Fit("cell metrics must be positive".into()));
        }

        let usable_width = (bounds.width - padding * 2.0).max(0.0);
        let usable_height = (bounds.height - padding * 2.0).max(0.0);
        let columns = clamp_cells(usable_width / cell_width);
        let screen_lines = clamp_cells(usable_height / cell_height);

        Ok(Self {
            width: bounds.width,
            height: bounds.height,
            cell_width,
            cell_height,
            padding,
            columns,
            screen_lines,
        })
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn screen_lines(&self) -> u16 {
        self.screen_lines
    }

    /// `(cols, rows)`, the order PTY resizes use.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.columns, self.screen_lines)
    }
}

fn clamp_cells(fit: f64) -> u16 {
    let cells = fit.floor();
    if cells < 1.0 {
        1
    } else if cells >= f64::from(MAX_DIMENSION) {
        MAX_DIMENSION
    } else {
        cells as u16
    }
}

// =============================================================================
// TESTS
// =============================================================================
