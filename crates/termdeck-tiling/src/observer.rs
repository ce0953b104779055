use std::collections::HashMap;

use termdeck_common::{Rect, SessionId};

/// Reports panes whose rect changed since the last observation.
#[derive(Debug, Default)]
pub struct ResizeObserver {
    last: HashMap<SessionId, Rect>,
}

impl ResizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `panes` and return the ones that are new or moved/resized.
    /// Sessions missing from `panes` are forgotten.
    pub fn observe(&mut self, panes: &[(SessionId, Rect)]) -> Vec<(SessionId, Rect)> {
        let changed = panes
            .iter()
            .filter(|(id, rect)| self.last.get(id) != Some(rect))
            .cloned()
            .collect();
        self.last = panes.iter().cloned().collect();
        changed
    }

    pub fn forget(&mut self, id: &SessionId) {
        self.last.remove(id);
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
