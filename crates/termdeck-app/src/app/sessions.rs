//! Session actions: open, close, rename, switch.

use termdeck_common::{SessionId, TermError};
use termdeck_session::{NewSession, PtyBridge, TerminalSession};

use super::TermdeckApp;

impl TermdeckApp {
    /// `false` once the session cap is reached (the "new terminal" button
    /// is disabled).
    pub fn can_open_terminal(&self) -> bool {
        self.registry.len() < self.max_sessions()
    }

    /// Open a new terminal and show it. Must run inside a Tokio runtime.
    pub fn new_terminal(&mut self, options: NewSession) -> Result<SessionId, TermError> {
        if !self.can_open_terminal() {
            let max = self.max_sessions();
            tracing::warn!(max, "new terminal refused: session limit reached");
            return Err(TermError::SessionLimit { max });
        }

        let id = self.registry.add_session(options)?;
        let bridge = PtyBridge::new(self.registry.clone(), id.clone(), self.settle_delay());
        self.bridges.insert(id.clone(), bridge);

        self.relayout()?;
        self.instances().focus(&id);
        Ok(id)
    }

    /// Close a terminal: its pane goes away, its process is killed and its
    /// engine instance destroyed. Unknown ids are ignored.
    pub fn close_terminal(&mut self, id: &SessionId) -> Result<(), TermError> {
        if !self.registry.contains(id) {
            return Ok(());
        }
        if let Some(mount) = self.mounts.remove(id) {
            mount.unmount();
        }
        if self.search.as_ref().is_some_and(|bar| &bar.session_id == id) {
            self.search = None;
        }
        self.bridges.remove(id);
        self.observer.forget(id);
        self.registry.remove_session(id);

        self.relayout()?;
        if let Some(active) = self.registry.active_id() {
            self.instances().focus(&active);
        }
        Ok(())
    }

    pub fn close_active(&mut self) -> Result<(), TermError> {
        match self.registry.active_id() {
            Some(id) => self.close_terminal(&id),
            None => Ok(()),
        }
    }

    pub fn rename(&self, id: &SessionId, title: &str) {
        self.registry.update_title(id, title);
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.registry.active_id()
    }

    pub fn sessions(&self) -> Vec<TerminalSession> {
        self.registry.sessions()
    }

    /// Make `id` active and give its engine keyboard focus.
    pub fn activate(&self, id: &SessionId) -> bool {
        if !self.registry.set_active(id) {
            return false;
        }
        self.instances().focus(id);
        true
    }

    pub fn focus_index(&self, index: usize) -> Option<SessionId> {
        let id = self.registry.set_active_by_index(index)?;
        self.instances().focus(&id);
        Some(id)
    }

    pub fn next_session(&self) -> Option<SessionId> {
        let id = self.registry.cycle_active(1)?;
        self.instances().focus(&id);
        Some(id)
    }

    pub fn prev_session(&self) -> Option<SessionId> {
        let id = self.registry.cycle_active(-1)?;
        self.instances().focus(&id);
        Some(id)
    }
}
