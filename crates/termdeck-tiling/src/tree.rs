//! Split tree: binary tree of dividers with pane slots at the leaves.

use serde::{Deserialize, Serialize};

/// Divider ratios never leave this range.
pub const MIN_RATIO: f64 = 0.1;
pub const MAX_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Side by side (vertical divider line).
    Horizontal,
    /// Stacked (horizontal divider line).
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitNode {
    Leaf {
        slot: usize,
    },
    Split {
        direction: Direction,
        ratio: f64,
        first: Box<SplitNode>,
        second: Box<SplitNode>,
    },
}

impl SplitNode {
    pub fn leaf(slot: usize) -> Self {
        SplitNode::Leaf { slot }
    }

    pub fn split_h(first: SplitNode, second: SplitNode) -> Self {
        SplitNode::Split {
            direction: Direction::Horizontal,
            ratio: 0.5,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn split_v(first: SplitNode, second: SplitNode) -> Self {
        SplitNode::Split {
            direction: Direction::Vertical,
            ratio: 0.5,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn pane_count(&self) -> usize {
        match self {
            SplitNode::Leaf { .. } => 1,
            SplitNode::Split { first, second, .. } => first.pane_count() + second.pane_count(),
        }
    }

    pub fn split_count(&self) -> usize {
        self.pane_count() - 1
    }

    /// Slots in depth-first order.
    pub fn collect_slots(&self) -> Vec<usize> {
        let mut slots = Vec::new();
        self.collect_slots_into(&mut slots);
        slots
    }

    fn collect_slots_into(&self, out: &mut Vec<usize>) {
        match self {
            SplitNode::Leaf { slot } => out.push(*slot),
            SplitNode::Split { first, second, .. } => {
                first.collect_slots_into(out);
                second.collect_slots_into(out);
            }
        }
    }

    /// Divider ratios in pre-order. Index `i` names divider `i` everywhere
    /// else in this crate.
    pub fn ratios(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.visit_splits(&mut |ratio| out.push(*ratio));
        out
    }

    /// Set divider `index`, clamped to [`MIN_RATIO`, `MAX_RATIO`].
    /// `false` if there is no such divider.
    pub fn set_ratio(&mut self, index: usize, ratio: f64) -> bool {
        let mut seen = 0;
        let mut hit = false;
        self.visit_splits_mut(&mut |r| {
            if seen == index {
                *r = clamp_ratio(ratio);
                hit = true;
            }
            seen += 1;
        });
        hit
    }

    /// Copy ratios from `ratios` onto the dividers in pre-order.
    pub fn apply_ratios(&mut self, ratios: &[f64]) {
        let mut iter = ratios.iter();
        self.visit_splits_mut(&mut |r| {
            if let Some(ratio) = iter.next() {
                *r = clamp_ratio(*ratio);
            }
        });
    }

    fn visit_splits(&self, f: &mut impl FnMut(&f64)) {
        if let SplitNode::Split {
            ratio,
            first,
            second,
            ..
        } = self
        {
            f(ratio);
            first.visit_splits(f);
            second.visit_splits(f);
        }
    }

    fn visit_splits_mut(&mut self, f: &mut impl FnMut(&mut f64)) {
        if let SplitNode::Split {
            ratio,
            first,
            second,
            ..
        } = self
        {
            f(ratio);
            first.visit_splits_mut(f);
            second.visit_splits_mut(f);
        }
    }
}

pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 0.5;
    }
    ratio.clamp(MIN_RATIO, MAX_RATIO)
}
