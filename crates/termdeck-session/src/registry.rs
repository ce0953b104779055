//! Session Registry: the ordered set of terminal sessions and which one is
//! active.
//!
//! The registry is a cheap clone handle around shared state. All updates
//! are targeted by id and silently ignore ids that are gone, so late
//! completions from a removed session are harmless. `remove_session` is the
//! only operation with teardown side effects.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use termdeck_common::{SessionId, TermError};
use termdeck_terminal::InstanceManager;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ipc::PtyIpc;

// =============================================================================
// SESSION RECORD
// =============================================================================

/// One terminal session as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalSession {
    pub id: SessionId,
    pub title: String,
    pub cwd: String,
    pub shell: Option<String>,
    pub is_active: bool,
    pub pty_created: bool,
    pub exit_code: Option<i32>,
}

impl TerminalSession {
    pub fn status(&self) -> SessionStatus {
        match self.exit_code {
            None => SessionStatus::Running,
            Some(code) => SessionStatus::Exited(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Running,
    Exited(i32),
}

impl SessionStatus {
    /// `true` only for a clean exit.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Exited(0))
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Options for [`SessionRegistry::add_session`]. Unset fields take the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub cwd: Option<String>,
    pub shell: Option<String>,
    pub title: Option<String>,
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Default)]
struct RegistryState {
    sessions: Vec<TerminalSession>,
    active: Option<SessionId>,
    /// Running counter for default titles. Never reused.
    opened: u64,
    routes: HashMap<SessionId, CancellationToken>,
}

impl RegistryState {
    fn find_mut(&mut self, id: &SessionId) -> Option<&mut TerminalSession> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    fn activate(&mut self, id: Option<SessionId>) {
        for session in &mut self.sessions {
            session.is_active = Some(&session.id) == id.as_ref();
        }
        self.active = id;
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    state: Arc<Mutex<RegistryState>>,
    ipc: Arc<dyn PtyIpc>,
    instances: Arc<InstanceManager>,
    default_cwd: String,
    max_sessions: Option<usize>,
}

impl SessionRegistry {
    pub fn new(ipc: Arc<dyn PtyIpc>, instances: Arc<InstanceManager>, default_cwd: String) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
            ipc,
            instances,
            default_cwd,
            max_sessions: None,
        }
    }

    /// Refuse `add_session` once `max` sessions are open.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = Some(max);
        self
    }

    pub fn ipc(&self) -> &Arc<dyn PtyIpc> {
        &self.ipc
    }

    pub fn instances(&self) -> &Arc<InstanceManager> {
        &self.instances
    }

    pub fn default_cwd(&self) -> &str {
        &self.default_cwd
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Register a new session and make it active.
    pub fn add_session(&self, options: NewSession) -> Result<SessionId, TermError> {
        let mut state = self.lock();
        if let Some(max) = self.max_sessions {
            if state.sessions.len() >= max {
                return Err(TermError::SessionLimit { max });
            }
        }

        state.opened += 1;
        let id = SessionId::new();
        let session = TerminalSession {
            id: id.clone(),
            title: options
                .title
                .unwrap_or_else(|| format!("Terminal {}", state.opened)),
            cwd: options
                .cwd
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| self.default_cwd.clone()),
            shell: options.shell,
            is_active: false,
            pty_created: false,
            exit_code: None,
        };
        info!(session_id = %id, title = %session.title, cwd = %session.cwd, "session added");

        state.sessions.push(session);
        state.routes.insert(id.clone(), CancellationToken::new());
        state.activate(Some(id.clone()));
        Ok(id)
    }

    /// Remove a session, kill its process and destroy its engine instance.
    ///
    /// If it was active, the most recently added remaining session becomes
    /// active. Unknown ids are ignored.
    pub fn remove_session(&self, id: &SessionId) {
        let route = {
            let mut state = self.lock();
            let Some(index) = state.sessions.iter().position(|s| &s.id == id) else {
                debug!(session_id = %id, "remove_session: unknown id");
                return;
            };
            state.sessions.remove(index);
            if state.active.as_ref() == Some(id) {
                let next = state.sessions.last().map(|s| s.id.clone());
                state.activate(next);
            }
            state.routes.remove(id)
        };

        self.ipc.kill(id);
        self.instances.destroy(id);
        if let Some(token) = route {
            token.cancel();
        }
        info!(session_id = %id, "session removed");
    }

    /// Remove every session. Used during shutdown.
    pub fn clear(&self) {
        for id in self.ids() {
            self.remove_session(&id);
        }
    }

    // =========================================================================
    // Activation
    // =========================================================================

    pub fn set_active(&self, id: &SessionId) -> bool {
        let mut state = self.lock();
        if !state.sessions.iter().any(|s| &s.id == id) {
            return false;
        }
        state.activate(Some(id.clone()));
        true
    }

    /// Activate the session at `index` in creation order.
    pub fn set_active_by_index(&self, index: usize) -> Option<SessionId> {
        let mut state = self.lock();
        let id = state.sessions.get(index)?.id.clone();
        state.activate(Some(id.clone()));
        Some(id)
    }

    /// Activate the session `step` places away from the active one,
    /// wrapping around. Negative steps go backwards.
    pub fn cycle_active(&self, step: isize) -> Option<SessionId> {
        let mut state = self.lock();
        let len = state.sessions.len();
        if len == 0 {
            return None;
        }
        let current = state
            .active
            .as_ref()
            .and_then(|a| state.sessions.iter().position(|s| &s.id == a))
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(len as isize) as usize;
        let id = state.sessions[next].id.clone();
        state.activate(Some(id.clone()));
        Some(id)
    }

    // =========================================================================
    // Targeted updates
    // =========================================================================

    pub fn update_title(&self, id: &SessionId, title: &str) {
        if let Some(session) = self.lock().find_mut(id) {
            session.title = title.to_string();
        }
    }

    pub fn mark_pty_created(&self, id: &SessionId) {
        if let Some(session) = self.lock().find_mut(id) {
            session.pty_created = true;
        }
    }

    /// Record the process exit code. Only the first call per session sticks.
    /// Returns `true` if this call set it.
    pub fn set_exit_code(&self, id: &SessionId, code: i32) -> bool {
        match self.lock().find_mut(id) {
            Some(session) if session.exit_code.is_none() => {
                session.exit_code = Some(code);
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: &SessionId) -> Option<TerminalSession> {
        self.lock().sessions.iter().find(|s| &s.id == id).cloned()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().sessions.iter().any(|s| &s.id == id)
    }

    pub fn sessions(&self) -> Vec<TerminalSession> {
        self.lock().sessions.clone()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.lock().sessions.iter().map(|s| s.id.clone()).collect()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.lock().active.clone()
    }

    pub fn index_of(&self, id: &SessionId) -> Option<usize> {
        self.lock().sessions.iter().position(|s| &s.id == id)
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }

    /// Token cancelled when the session is removed. Already cancelled for
    /// unknown ids.
    pub fn routing_token(&self, id: &SessionId) -> CancellationToken {
        self.lock().routes.get(id).cloned().unwrap_or_else(|| {
            let token = CancellationToken::new();
            token.cancel();
            token
        })
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("active", &self.active_id())
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
