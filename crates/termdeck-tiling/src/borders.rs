//! Divider geometry for drag-resize hit testing.
//!
//! One `SplitBorder` per divider, in the same pre-order that
//! [`SplitNode::ratios`](crate::tree::SplitNode::ratios) uses.

use termdeck_common::Rect;

use crate::layout::split_rect;
use crate::tree::{Direction, SplitNode};

#[derive(Debug, Clone, PartialEq)]
pub struct SplitBorder {
    /// Divider index.
    pub index: usize,
    pub direction: Direction,
    /// Position of the divider in pixels (x for horizontal, y for vertical).
    pub position: f64,
    /// Start of the divider line (y for horizontal, x for vertical).
    pub start: f64,
    pub end: f64,
    /// The whole region this divider splits.
    pub bounds: Rect,
}

impl SplitBorder {
    /// Half-width of the hit zone on each side of the border.
    const HIT_HALF_WIDTH: f64 = 6.0;

    pub fn hit_test(&self, x: f64, y: f64) -> bool {
        let (along, across) = match self.direction {
            Direction::Horizontal => (y, x),
            Direction::Vertical => (x, y),
        };
        (across - self.position).abs() <= Self::HIT_HALF_WIDTH
            && along >= self.start
            && along <= self.end
    }

    /// Pixel extent the ratio is measured against.
    pub fn span(&self) -> f64 {
        match self.direction {
            Direction::Horizontal => self.bounds.width,
            Direction::Vertical => self.bounds.height,
        }
    }

    /// Pointer coordinate that moves this divider.
    pub fn axis(&self, x: f64, y: f64) -> f64 {
        match self.direction {
            Direction::Horizontal => x,
            Direction::Vertical => y,
        }
    }

    pub fn pixel_to_ratio(&self, pixel_delta: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        pixel_delta / span
    }
}

pub fn compute_borders(root: &SplitNode, bounds: Rect, gap: f64) -> Vec<SplitBorder> {
    let mut borders = Vec::new();
    walk_borders(root, bounds, gap, &mut borders);
    borders
}

fn walk_borders(node: &SplitNode, bounds: Rect, gap: f64, out: &mut Vec<SplitBorder>) {
    let SplitNode::Split {
        direction,
        ratio,
        first,
        second,
    } = node
    else {
        return;
    };

    let (a, b) = split_rect(bounds, *direction, *ratio, gap);
    let (position, start, end) = match direction {
        Direction::Horizontal => (a.x + a.width + gap / 2.0, bounds.y, bounds.y + bounds.height),
        Direction::Vertical => (a.y + a.height + gap / 2.0, bounds.x, bounds.x + bounds.width),
    };
    out.push(SplitBorder {
        index: out.len(),
        direction: *direction,
        position,
        start,
        end,
        bounds,
    });
    walk_borders(first, a, gap, out);
    walk_borders(second, b, gap, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;

    fn viewport() -> Rect {
        Rect::sized(800.0, 600.0)
    }

    #[test]
    fn single_pane_no_borders() {
        let tree = LayoutMode::tree(1).unwrap();
        assert!(compute_borders(&tree, viewport(), 2.0).is_empty());
    }

    #[test]
    fn split_one_border() {
        let tree = LayoutMode::tree(2).unwrap();
        let borders = compute_borders(&tree, viewport(), 2.0);
        assert_eq!(borders.len(), 1);
        assert_eq!(borders[0].direction, Direction::Horizontal);
        // 50% of (800 - 2) = 399, border at 399 + 1 = 400
        assert!((borders[0].position - 400.0).abs() < 1.0);
    }

    #[test]
    fn grid_borders_in_pre_order() {
        let tree = LayoutMode::tree(4).unwrap();
        let borders = compute_borders(&tree, viewport(), 0.0);
        assert_eq!(borders.len(), 3);
        assert_eq!(borders[0].direction, Direction::Vertical);
        assert!((borders[0].position - 300.0).abs() < 0.01);
        assert_eq!(borders[1].direction, Direction::Horizontal);
        assert!((borders[1].end - 300.0).abs() < 0.01);
        assert!((borders[2].start - 300.0).abs() < 0.01);
        let indices: Vec<usize> = borders.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn hit_test_horizontal_border() {
        let tree = LayoutMode::tree(2).unwrap();
        let border = &compute_borders(&tree, viewport(), 0.0)[0];
        assert!(border.hit_test(400.0, 300.0));
        assert!(border.hit_test(405.0, 300.0));
        assert!(border.hit_test(395.0, 300.0));
        assert!(!border.hit_test(410.0, 300.0));
        assert!(!border.hit_test(400.0, -1.0));
        assert!(!border.hit_test(400.0, 601.0));
    }

    #[test]
    fn hit_test_vertical_border() {
        let tree = LayoutMode::tree(3).unwrap();
        let border = &compute_borders(&tree, viewport(), 0.0)[0];
        assert!(border.hit_test(400.0, 300.0));
        assert!(border.hit_test(400.0, 305.0));
        assert!(!border.hit_test(400.0, 310.0));
    }

    #[test]
    fn pixel_to_ratio() {
        let tree = LayoutMode::tree(3).unwrap();
        let borders = compute_borders(&tree, viewport(), 0.0);
        // 60px = 10% of 600
        assert!((borders[0].pixel_to_ratio(60.0) - 0.1).abs() < 0.001);
        // 80px = 10% of 800
        assert!((borders[1].pixel_to_ratio(80.0) - 0.1).abs() < 0.001);
    }

    #[test]
    fn pixel_to_ratio_zero_span() {
        let tree = LayoutMode::tree(2).unwrap();
        let borders = compute_borders(&tree, Rect::sized(0.0, 0.0), 0.0);
        assert_eq!(borders[0].pixel_to_ratio(100.0), 0.0);
    }
}
