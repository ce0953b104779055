//! Multiplexer: which session sits in which pane, and where each pane is.
//!
//! Panes hold session ids only. The session count picks the layout mode;
//! divider ratios survive as long as the mode does.

use serde::Serialize;
use termdeck_common::{Rect, SessionId, TermError};

use crate::borders::{compute_borders, SplitBorder};
use crate::layout::{LayoutEngine, LayoutMode, MAX_PANES};
use crate::tree::SplitNode;

/// One visible pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneLayout {
    pub slot: usize,
    pub session_id: SessionId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    index: usize,
    origin: f64,
    start_ratio: f64,
}

#[derive(Debug)]
pub struct Multiplexer {
    engine: LayoutEngine,
    bounds: Rect,
    sessions: Vec<SessionId>,
    tree: Option<SplitNode>,
    drag: Option<DragState>,
}

impl Multiplexer {
    pub fn new(engine: LayoutEngine, bounds: Rect) -> Self {
        Self {
            engine,
            bounds,
            sessions: Vec::new(),
            tree: None,
            drag: None,
        }
    }

    pub fn mode(&self) -> LayoutMode {
        LayoutMode::for_count(self.sessions.len())
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn sessions(&self) -> &[SessionId] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Show `sessions`, one per pane, in order.
    ///
    /// The tree is rebuilt only when the pane count changes, so ratios the
    /// user dragged are kept across a reorder.
    pub fn set_sessions(&mut self, sessions: Vec<SessionId>) -> Result<(), TermError> {
        if sessions.len() > MAX_PANES {
            return Err(TermError::SessionLimit { max: MAX_PANES });
        }
        if sessions.len() != self.sessions.len() {
            self.tree = LayoutMode::tree(sessions.len());
            self.drag = None;
        }
        self.sessions = sessions;
        Ok(())
    }

    pub fn slot_of(&self, id: &SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s == id)
    }

    pub fn panes(&self) -> Vec<PaneLayout> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        self.engine
            .compute(tree, self.bounds)
            .into_iter()
            .filter_map(|(slot, rect)| {
                Some(PaneLayout {
                    slot,
                    session_id: self.sessions.get(slot)?.clone(),
                    rect,
                })
            })
            .collect()
    }

    pub fn rect_of(&self, id: &SessionId) -> Option<Rect> {
        self.panes()
            .into_iter()
            .find(|pane| &pane.session_id == id)
            .map(|pane| pane.rect)
    }

    /// Session whose pane contains the point.
    pub fn pane_at(&self, x: f64, y: f64) -> Option<SessionId> {
        self.panes()
            .into_iter()
            .find(|pane| pane.rect.contains(x, y))
            .map(|pane| pane.session_id)
    }

    // =========================================================================
    // Dividers
    // =========================================================================

    pub fn borders(&self) -> Vec<SplitBorder> {
        match &self.tree {
            Some(tree) => compute_borders(tree, self.bounds, f64::from(self.engine.gap)),
            None => Vec::new(),
        }
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.tree.as_ref().map(SplitNode::ratios).unwrap_or_default()
    }

    /// Set divider `index`, keeping both sides at least `min_pane_size`.
    pub fn set_ratio(&mut self, index: usize, ratio: f64) -> bool {
        let Some(border) = self.borders().into_iter().nth(index) else {
            return false;
        };
        let (min, max) = self.engine.ratio_bounds(border.span());
        let ratio = if ratio.is_nan() { 0.5 } else { ratio.clamp(min, max) };
        self.tree
            .as_mut()
            .is_some_and(|tree| tree.set_ratio(index, ratio))
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging the divider under the pointer. `false` if there is none.
    pub fn begin_drag(&mut self, x: f64, y: f64) -> bool {
        let ratios = self.ratios();
        let Some(border) = self.borders().into_iter().find(|b| b.hit_test(x, y)) else {
            return false;
        };
        let Some(start_ratio) = ratios.get(border.index).copied() else {
            return false;
        };
        self.drag = Some(DragState {
            index: border.index,
            origin: border.axis(x, y),
            start_ratio,
        });
        true
    }

    /// Move the dragged divider with the pointer. `true` if a ratio changed.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(border) = self.borders().into_iter().nth(drag.index) else {
            self.drag = None;
            return false;
        };
        let delta = border.pixel_to_ratio(border.axis(x, y) - drag.origin);
        let before = self.ratios().get(drag.index).copied();
        self.set_ratio(drag.index, drag.start_ratio + delta);
        self.ratios().get(drag.index).copied() != before
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}
