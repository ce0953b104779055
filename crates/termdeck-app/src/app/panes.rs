//! Pane layout: mount sessions into containers, follow size changes, and
//! handle pointer input on panes and dividers.

use termdeck_common::{ContainerId, Rect, SessionId, TermError};
use termdeck_tiling::{LayoutMode, PaneLayout};

use super::TermdeckApp;

impl TermdeckApp {
    pub fn layout_mode(&self) -> LayoutMode {
        self.mux.mode()
    }

    pub fn panes(&self) -> Vec<PaneLayout> {
        self.mux.panes()
    }

    pub fn set_viewport(&mut self, viewport: Rect) -> Result<(), TermError> {
        self.mux.set_bounds(viewport);
        self.relayout()
    }

    /// Sync panes with the registry: mount newly visible sessions, unmount
    /// hidden ones, and refit panes whose rect changed.
    pub(super) fn relayout(&mut self) -> Result<(), TermError> {
        self.mux.set_sessions(self.registry.ids())?;
        let panes = self.mux.panes();

        let visible: Vec<&SessionId> = panes.iter().map(|p| &p.session_id).collect();
        let hidden: Vec<SessionId> = self
            .mounts
            .keys()
            .filter(|id| !visible.contains(id))
            .cloned()
            .collect();
        for id in hidden {
            if let Some(mount) = self.mounts.remove(&id) {
                mount.unmount();
            }
        }

        for pane in &panes {
            if self.mounts.contains_key(&pane.session_id) {
                continue;
            }
            let Some(bridge) = self.bridges.get(&pane.session_id) else {
                continue;
            };
            let container = ContainerId(self.next_container);
            self.next_container += 1;
            match bridge.mount(container, pane.rect) {
                Ok(mount) => {
                    self.mounts.insert(pane.session_id.clone(), mount);
                }
                Err(e) => {
                    tracing::warn!(session_id = %pane.session_id, error = %e, "mount failed");
                }
            }
        }

        let observed: Vec<(SessionId, Rect)> = panes
            .into_iter()
            .map(|p| (p.session_id, p.rect))
            .collect();
        for (id, rect) in self.observer.observe(&observed) {
            self.instances().resize_container(&id, rect);
        }

        self.paint();
        Ok(())
    }

    /// Run deferred work due at the next paint: pending fits.
    pub fn paint(&self) -> usize {
        self.instances().run_pending_fits()
    }

    pub fn is_mounted(&self, id: &SessionId) -> bool {
        self.mounts.contains_key(id)
    }

    pub fn container_of(&self, id: &SessionId) -> Option<ContainerId> {
        self.mounts.get(id).map(|mount| mount.container())
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Press: grab a divider if one is under the pointer, else activate the
    /// pane that was clicked.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<SessionId> {
        if self.mux.begin_drag(x, y) {
            return None;
        }
        self.click_pane(x, y)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, TermError> {
        if !self.mux.drag_to(x, y) {
            return Ok(false);
        }
        self.relayout()?;
        Ok(true)
    }

    pub fn pointer_up(&mut self) {
        self.mux.end_drag();
    }

    pub fn click_pane(&self, x: f64, y: f64) -> Option<SessionId> {
        let id = self.mux.pane_at(x, y)?;
        self.activate(&id);
        Some(id)
    }
}
