//! In-process PTY host: spawns shells with `portable-pty` and serves the
//! `PtyIpc` contract.
//!
//! Each session gets its own PTY and a background reader thread. Input
//! flows from `write` to the PTY writer; output and exit flow from the
//! reader thread onto the shared event bus.

mod spawn;
mod types;

pub use spawn::{default_shell, resolve_shell};
pub use types::{PtyError, PtyHandle, DEFAULT_COLS, DEFAULT_ROWS};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use termdeck_common::{PtyEvent, PtyEventBus, SessionId, TermError};
use termdeck_config::schema::ShellConfig;
use tokio::sync::broadcast;

use crate::ipc::{CreateOptions, PtyIpc, SpawnInfo};

/// Owns every session's process handle.
pub struct PtyHost {
    shell: ShellConfig,
    bus: Arc<PtyEventBus>,
    handles: Mutex<HashMap<SessionId, PtyHandle>>,
}

impl PtyHost {
    pub fn new(shell: ShellConfig) -> Self {
        Self {
            shell,
            bus: Arc::new(PtyEventBus::default()),
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.lock().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Current PTY size of a session as `(cols, rows)`.
    pub fn size(&self, session_id: &SessionId) -> Option<(u16, u16)> {
        self.lock().get(session_id).map(PtyHandle::size)
    }

    /// Kill and forget every process. Used during shutdown.
    pub fn kill_all(&self) {
        let handles: Vec<_> = self.lock().drain().collect();
        let count = handles.len();
        for (_, mut handle) in handles {
            handle.kill();
        }
        tracing::info!(count, "All PTYs killed");
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, PtyHandle>> {
        self.handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PtyIpc for PtyHost {
    async fn create(
        &self,
        session_id: &SessionId,
        options: CreateOptions,
    ) -> Result<SpawnInfo, TermError> {
        if self.contains(session_id) {
            return Err(PtyError::AlreadyRunning.into());
        }

        let id = session_id.clone();
        let shell = self.shell.clone();
        let bus = Arc::clone(&self.bus);
        let handle = tokio::task::spawn_blocking(move || {
            spawn::spawn_session(&id, &shell, &options, bus)
        })
        .await
        .map_err(|e| TermError::Pty(format!("spawn task failed: {e}")))?
        .inspect_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "Failed to spawn PTY");
        })?;

        let info = SpawnInfo { pid: handle.pid() };
        self.lock().insert(session_id.clone(), handle);
        Ok(info)
    }

    fn write(&self, session_id: &SessionId, data: &str) {
        let mut handles = self.lock();
        let Some(handle) = handles.get_mut(session_id) else {
            tracing::debug!(session_id = %session_id, "pty_write for unknown session");
            return;
        };
        if let Err(e) = handle.write_input(data.as_bytes()) {
            tracing::warn!(session_id = %session_id, error = %e, "PTY write failed");
        }
    }

    fn resize(&self, session_id: &SessionId, cols: u16, rows: u16) {
        let mut handles = self.lock();
        let Some(handle) = handles.get_mut(session_id) else {
            tracing::debug!(session_id = %session_id, "pty_resize for unknown session");
            return;
        };
        match handle.resize(cols, rows) {
            Ok(()) => tracing::debug!(session_id = %session_id, cols, rows, "PTY resized"),
            Err(e) => tracing::warn!(session_id = %session_id, error = %e, "PTY resize failed"),
        }
    }

    fn kill(&self, session_id: &SessionId) {
        let removed = self.lock().remove(session_id);
        if let Some(mut handle) = removed {
            handle.kill();
            tracing::info!(session_id = %session_id, "PTY killed");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<PtyEvent> {
        self.bus.subscribe()
    }
}

impl Drop for PtyHost {
    fn drop(&mut self) {
        if !self.is_empty() {
            self.kill_all();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh_host() -> PtyHost {
        PtyHost::new(ShellConfig {
            program: "/bin/sh".into(),
            login_shell: false,
            ..Default::default()
        })
    }

    fn temp_cwd() -> CreateOptions {
        CreateOptions {
            cwd: std::env::temp_dir().to_string_lossy().into_owned(),
            shell: None,
        }
    }

    /// Collect a session's output until its exit event.
    async fn drain_until_exit(
        rx: &mut broadcast::Receiver<PtyEvent>,
        id: &SessionId,
    ) -> (String, i32) {
        let mut output = String::new();
        loop {
            match rx.recv().await {
                Ok(PtyEvent::Data { session_id, chunk }) if &session_id == id => {
                    output.push_str(&chunk);
                }
                Ok(PtyEvent::Exit { session_id, code }) if &session_id == id => {
                    return (output, code);
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("bus closed"),
            }
        }
    }

    #[tokio::test]
    async fn spawn_echo_and_exit_code() {
        let host = sh_host();
        let mut rx = host.subscribe();
        let id = SessionId::from("echo");

        let info = host.create(&id, temp_cwd()).await.expect("spawn should succeed");
        assert!(info.pid.is_some());
        assert!(host.contains(&id));

        host.write(&id, "echo PTY_TEST_MARKER_12345; exit 3\n");

        let (output, code) = tokio::time::timeout(Duration::from_secs(10), drain_until_exit(&mut rx, &id))
            .await
            .expect("shell should exit");
        assert!(
            output.contains("PTY_TEST_MARKER_12345"),
            "output should contain echo marker, got: {output}"
        );
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn resize_updates_size() {
        let host = sh_host();
        let id = SessionId::from("resize");
        host.create(&id, temp_cwd()).await.unwrap();
        assert_eq!(host.size(&id), Some((DEFAULT_COLS, DEFAULT_ROWS)));

        host.resize(&id, 120, 40);
        assert_eq!(host.size(&id), Some((120, 40)));
        host.kill(&id);
    }

    #[tokio::test]
    async fn second_create_for_same_session_fails() {
        let host = sh_host();
        let id = SessionId::from("dup");
        host.create(&id, temp_cwd()).await.unwrap();
        let err = host.create(&id, temp_cwd()).await.unwrap_err();
        assert!(err.to_string().contains("already has a process"));
        host.kill_all();
        assert!(host.is_empty());
    }

    #[tokio::test]
    async fn missing_cwd_fails_create() {
        let host = sh_host();
        let id = SessionId::from("nocwd");
        let err = host
            .create(
                &id,
                CreateOptions {
                    cwd: "/definitely/not/a/dir".into(),
                    shell: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TermError::Pty(_)));
        assert!(!host.contains(&id));
    }

    #[tokio::test]
    async fn kill_publishes_exit() {
        let host = sh_host();
        let mut rx = host.subscribe();
        let id = SessionId::from("kill");
        host.create(&id, temp_cwd()).await.unwrap();

        host.kill(&id);
        assert!(!host.contains(&id));

        let result = tokio::time::timeout(Duration::from_secs(10), drain_until_exit(&mut rx, &id)).await;
        assert!(result.is_ok(), "killed shell should report an exit");
    }

    #[test]
    fn unknown_session_operations_are_noops() {
        let host = sh_host();
        let id = SessionId::from("ghost");
        host.write(&id, "ls\n");
        host.resize(&id, 100, 30);
        host.kill(&id);
        assert!(host.is_empty());
        assert_eq!(host.size(&id), None);
    }
}
