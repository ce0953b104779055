use super::TermdeckApp;

impl TermdeckApp {
    /// Tear everything down: hide every pane, then remove every session,
    /// which kills its process and destroys its engine instance.
    pub fn shutdown(&mut self) {
        tracing::info!(sessions = self.registry.len(), "Initiating shutdown");

        self.search = None;
        for (_, mount) in self.mounts.drain() {
            mount.unmount();
        }
        self.registry.clear();
        self.bridges.clear();
        self.observer.clear();
        if let Err(e) = self.mux.set_sessions(Vec::new()) {
            tracing::debug!(error = %e, "clearing layout failed");
        }

        tracing::info!("Shutdown complete");
    }
}
