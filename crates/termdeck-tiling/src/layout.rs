//! Layout modes and tree-to-rect computation.

use serde::{Deserialize, Serialize};
use termdeck_common::Rect;
use termdeck_config::schema::LayoutConfig;

use crate::tree::{Direction, SplitNode};

/// Most panes a layout shows at once.
pub const MAX_PANES: usize = 4;

// =============================================================================
// MODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    Single,
    /// Two panes side by side.
    Split,
    /// 2x2 grid. With three panes the bottom row is one full-width pane.
    Grid,
}

impl LayoutMode {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Single,
            2 => Self::Split,
            _ => Self::Grid,
        }
    }

    /// Default tree for `count` panes (at most [`MAX_PANES`]).
    pub fn tree(count: usize) -> Option<SplitNode> {
        use SplitNode as N;
        let tree = match count {
            0 => return None,
            1 => N::leaf(0),
            2 => N::split_h(N::leaf(0), N::leaf(1)),
            3 => N::split_v(N::split_h(N::leaf(0), N::leaf(1)), N::leaf(2)),
            _ => N::split_v(
                N::split_h(N::leaf(0), N::leaf(1)),
                N::split_h(N::leaf(2), N::leaf(3)),
            ),
        };
        Some(tree)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Computes pane rects from a split tree.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    /// Gap in pixels between panes.
    pub gap: u32,
    /// Smallest width or height a drag may shrink a pane to.
    pub min_pane_size: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for LayoutEngine {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            gap: config.gap,
            min_pane_size: config.min_pane_size,
        }
    }
}

impl LayoutEngine {
    pub fn compute(&self, root: &SplitNode, bounds: Rect) -> Vec<(usize, Rect)> {
        let mut results = Vec::new();
        self.layout_node(root, bounds, &mut results);
        results
    }

    fn layout_node(&self, node: &SplitNode, bounds: Rect, out: &mut Vec<(usize, Rect)>) {
        match node {
            SplitNode::Leaf { slot } => out.push((*slot, bounds)),
            SplitNode::Split {
                direction,
                ratio,
                first,
                second,
            } => {
                let (a, b) = split_rect(bounds, *direction, *ratio, f64::from(self.gap));
                self.layout_node(first, a, out);
                self.layout_node(second, b, out);
            }
        }
    }

    /// Ratio limits that keep both sides of a divider at least
    /// `min_pane_size` across `span` pixels.
    pub fn ratio_bounds(&self, span: f64) -> (f64, f64) {
        let avail = (span - f64::from(self.gap)).max(0.0);
        if avail <= 0.0 {
            return (crate::tree::MIN_RATIO, crate::tree::MAX_RATIO);
        }
        let min = (self.min_pane_size / avail).max(crate::tree::MIN_RATIO);
        let max = (1.0 - self.min_pane_size / avail).min(crate::tree::MAX_RATIO);
        if min > max {
            (0.5, 0.5)
        } else {
            (min, max)
        }
    }
}

/// Split `bounds` into the two child rects of a divider.
pub(crate) fn split_rect(bounds: Rect, direction: Direction, ratio: f64, gap: f64) -> (Rect, Rect) {
    match direction {
        Direction::Horizontal => {
            let available = (bounds.width - gap).max(0.0);
            let w1 = available * ratio;
            let w2 = (available - w1).max(0.0);
            (
                Rect::new(bounds.x, bounds.y, w1, bounds.height),
                Rect::new(bounds.x + w1 + gap, bounds.y, w2, bounds.height),
            )
        }
        Direction::Vertical => {
            let available = (bounds.height - gap).max(0.0);
            let h1 = available * ratio;
            let h2 = (available - h1).max(0.0);
            (
                Rect::new(bounds.x, bounds.y, bounds.width, h1),
                Rect::new(bounds.x, bounds.y + h1 + gap, bounds.width, h2),
            )
        }
    }
}
