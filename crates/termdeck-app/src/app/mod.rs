//! Application hub: owns the registry, one bridge per session, the pane
//! layout and the live mounts, and turns UI actions into calls on them.

mod dispatch;
mod panes;
mod sessions;
mod shutdown;
mod terminal;


use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use termdeck_common::{Rect, SessionId};
use termdeck_config::schema::TermdeckConfig;
use termdeck_session::{Mount, PtyBridge, PtyIpc, SessionRegistry};
use termdeck_terminal::{EngineOptions, InstanceManager};
use termdeck_tiling::{LayoutEngine, Multiplexer, ResizeObserver};

use crate::clipboard::ClipboardProvider;
use crate::keymap::Keymap;

/// Open search bar: which session it searches and the current term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBar {
    pub session_id: SessionId,
    pub term: String,
}

pub struct TermdeckApp {
    config: TermdeckConfig,
    registry: SessionRegistry,
    bridges: HashMap<SessionId, PtyBridge>,
    mounts: HashMap<SessionId, Mount>,
    mux: Multiplexer,
    observer: ResizeObserver,
    next_container: u64,
    search: Option<SearchBar>,
    clipboard: Box<dyn ClipboardProvider>,
    keymap: Keymap,
    quit_requested: bool,
}

impl TermdeckApp {
    pub fn new(
        config: TermdeckConfig,
        ipc: Arc<dyn PtyIpc>,
        viewport: Rect,
        clipboard: Box<dyn ClipboardProvider>,
    ) -> Self {
        let instances = Arc::new(InstanceManager::new(EngineOptions::from(&config.terminal)));
        let registry = SessionRegistry::new(ipc, instances, config.shell.default_cwd());
        let mux = Multiplexer::new(LayoutEngine::from(&config.layout), viewport);

        tracing::info!(
            max_sessions = config.terminal.max_sessions,
            cwd = %registry.default_cwd(),
            "termdeck app initialized"
        );

        Self {
            config,
            registry,
            bridges: HashMap::new(),
            mounts: HashMap::new(),
            mux,
            observer: ResizeObserver::new(),
            next_container: 1,
            search: None,
            clipboard,
            keymap: Keymap::default(),
            quit_requested: false,
        }
    }

    pub fn config(&self) -> &TermdeckConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn instances(&self) -> &Arc<InstanceManager> {
        self.registry.instances()
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn bridge(&self, id: &SessionId) -> Option<&PtyBridge> {
        self.bridges.get(id)
    }

    pub fn search_bar(&self) -> Option<&SearchBar> {
        self.search.as_ref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn max_sessions(&self) -> usize {
        self.config.terminal.max_sessions as usize
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.config.terminal.settle_delay_ms))
    }
}
