//! PTY bridge: connects one session's engine instance to its process.
//!
//! Output routing lives as long as the session: a task filters the shared
//! event channel for this session and feeds the engine whether or not a
//! pane is showing it. Input, resize and title routing live only as long
//! as a [`Mount`]. Process creation happens at most once per session and
//! is never cancelled.

mod mount;
mod state;

#[cfg(test)]
mod tests;

pub use mount::Mount;
pub use state::BridgeState;

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use termdeck_common::{ContainerId, PtyEvent, Rect, SessionId, TermError};
use termdeck_terminal::{EngineEvent, InstanceManager};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ipc::{CreateOptions, PtyIpc};
use crate::registry::SessionRegistry;

/// Trailer written into the engine when the process exits.
pub fn exit_trailer(code: i32) -> String {
    format!("\r\n[Process exited with code {code}]")
}

#[derive(Debug, Default)]
struct Shared {
    state: BridgeState,
    /// Latest resize requested before the process was ready.
    pending_resize: Option<(u16, u16)>,
}

struct BridgeInner {
    session_id: SessionId,
    registry: SessionRegistry,
    settle_delay: Duration,
    shared: Mutex<Shared>,
}

/// One session's bridge. Cheap to clone.
#[derive(Clone)]
pub struct PtyBridge {
    inner: Arc<BridgeInner>,
}

impl PtyBridge {
    /// Create the bridge and start routing output for `session_id`.
    ///
    /// Must be called from within a Tokio runtime. Routing stops when the
    /// session is removed from `registry`.
    pub fn new(registry: SessionRegistry, session_id: SessionId, settle_delay: Duration) -> Self {
        let events = registry.ipc().subscribe();
        let token = registry.routing_token(&session_id);
        let inner = Arc::new(BridgeInner {
            session_id,
            registry,
            settle_delay,
            shared: Mutex::new(Shared::default()),
        });
        tokio::spawn(route_output(Arc::clone(&inner), events, token));
        Self { inner }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    pub fn state(&self) -> BridgeState {
        self.inner.lock().state
    }

    pub fn pending_resize(&self) -> Option<(u16, u16)> {
        self.inner.lock().pending_resize
    }

    /// Show the session in `container`.
    ///
    /// The first mount starts the process; later mounts only resize it.
    /// Dropping the returned [`Mount`] hides the session again.
    pub fn mount(&self, container: ContainerId, bounds: Rect) -> Result<Mount, TermError> {
        let inner = &self.inner;
        let id = &inner.session_id;
        let instances = Arc::clone(inner.registry.instances());

        instances.create(id);
        instances.attach(id, container, bounds)?;

        let weak: Weak<BridgeInner> = Arc::downgrade(inner);
        let subscription = instances
            .subscribe(
                id,
                Arc::new(move |event: &EngineEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_engine_event(event);
                    }
                }),
            )
            .ok_or_else(|| TermError::UnknownSession(id.clone()))?;

        let pty_created = inner
            .registry
            .get(id)
            .is_some_and(|session| session.pty_created);

        if pty_created {
            inner.flush_resize();
        } else if inner.begin_creating() {
            tokio::spawn(create_process(Arc::clone(inner)));
        } else {
            debug!(session_id = %id, "mount while process creation in flight");
        }

        Ok(Mount::new(id.clone(), container, instances, subscription))
    }
}

impl std::fmt::Debug for PtyBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyBridge")
            .field("session_id", &self.inner.session_id)
            .field("state", &self.state())
            .finish()
    }
}

impl BridgeInner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ipc(&self) -> &Arc<dyn PtyIpc> {
        self.registry.ipc()
    }

    fn instances(&self) -> &Arc<InstanceManager> {
        self.registry.instances()
    }

    /// `Uninitialized -> Creating`. `false` if creation already started.
    fn begin_creating(&self) -> bool {
        let mut shared = self.lock();
        if shared.state != BridgeState::Uninitialized {
            return false;
        }
        shared.state = BridgeState::Creating;
        true
    }

    fn on_engine_event(&self, event: &EngineEvent) {
        let id = &self.session_id;
        match event {
            EngineEvent::Input(data) => self.ipc().write(id, data),
            EngineEvent::Resize { cols, rows } => self.request_resize(*cols, *rows),
            EngineEvent::TitleChanged(title) => self.registry.update_title(id, title),
        }
    }

    /// Forward a resize, or keep it for after creation.
    fn request_resize(&self, cols: u16, rows: u16) {
        {
            let mut shared = self.lock();
            if shared.state != BridgeState::Ready {
                shared.pending_resize = Some((cols, rows));
                return;
            }
        }
        self.ipc().resize(&self.session_id, cols, rows);
    }

    /// Send one resize: the container's proposed size, else the deferred
    /// size, else the engine's current size.
    fn flush_resize(&self) {
        let id = &self.session_id;
        let pending = self.lock().pending_resize.take();
        let dims = self
            .instances()
            .propose_dimensions(id)
            .or(pending)
            .or_else(|| self.instances().dimensions(id));
        if let Some((cols, rows)) = dims {
            self.ipc().resize(id, cols, rows);
        }
    }

    fn on_exit(&self, code: i32) {
        let id = &self.session_id;
        if !self.registry.set_exit_code(id, code) {
            return;
        }
        self.lock().state = BridgeState::Exited;
        self.instances().write(id, &exit_trailer(code));
        info!(session_id = %id, code, "session process exited");
    }
}

// =============================================================================
// TASKS
// =============================================================================

async fn create_process(inner: Arc<BridgeInner>) {
    let id = inner.session_id.clone();
    let Some(session) = inner.registry.get(&id) else {
        debug!(session_id = %id, "session removed before process creation");
        return;
    };
    let options = CreateOptions {
        cwd: session.cwd,
        shell: session.shell,
    };

    match inner.ipc().create(&id, options).await {
        Ok(info) => {
            {
                let mut shared = inner.lock();
                if shared.state == BridgeState::Creating {
                    shared.state = BridgeState::Ready;
                }
            }
            inner.registry.mark_pty_created(&id);
            info!(session_id = %id, pid = ?info.pid, "session process created");

            if !inner.settle_delay.is_zero() {
                tokio::time::sleep(inner.settle_delay).await;
            }
            inner.flush_resize();
        }
        Err(e) => {
            warn!(session_id = %id, error = %e, "session process creation failed");
            inner
                .instances()
                .write_error(&id, &format!("Failed to start terminal: {e}"));
        }
    }
}

async fn route_output(
    inner: Arc<BridgeInner>,
    mut events: broadcast::Receiver<PtyEvent>,
    token: CancellationToken,
) {
    let id = inner.session_id.clone();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = events.recv() => match event {
                Ok(PtyEvent::Data { session_id, chunk }) if session_id == id => {
                    inner.instances().write(&id, &chunk);
                }
                Ok(PtyEvent::Exit { session_id, code }) if session_id == id => {
                    inner.on_exit(code);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session_id = %id, skipped, "output routing lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    debug!(session_id = %id, "output routing stopped");
}
