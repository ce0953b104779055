//! In-memory `PtyIpc` that records every call and lets tests drive output.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use termdeck_common::{PtyEvent, PtyEventBus, SessionId, TermError};
use tokio::sync::{broadcast, Notify};

use super::{CreateOptions, PtyIpc, SpawnInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcCall {
    Create {
        session_id: SessionId,
        options: CreateOptions,
    },
    Write {
        session_id: SessionId,
        data: String,
    },
    Resize {
        session_id: SessionId,
        cols: u16,
        rows: u16,
    },
    Kill {
        session_id: SessionId,
    },
}

pub struct RecordingIpc {
    bus: PtyEventBus,
    calls: Mutex<Vec<IpcCall>>,
    create_failure: Mutex<Option<String>>,
    creates_open: AtomicBool,
    gate: Notify,
    next_pid: AtomicU32,
}

impl RecordingIpc {
    pub fn new() -> Self {
        Self {
            bus: PtyEventBus::default(),
            calls: Mutex::new(Vec::new()),
            create_failure: Mutex::new(None),
            creates_open: AtomicBool::new(true),
            gate: Notify::new(),
            next_pid: AtomicU32::new(1000),
        }
    }

    /// Make every following `create` fail with `message`.
    pub fn fail_creates_with(&self, message: &str) {
        *lock(&self.create_failure) = Some(message.to_string());
    }

    /// Park `create` calls until [`release_creates`](Self::release_creates).
    pub fn hold_creates(&self) {
        self.creates_open.store(false, Ordering::SeqCst);
    }

    pub fn release_creates(&self) {
        self.creates_open.store(true, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    /// Publish process output for `session_id`.
    pub fn emit_data(&self, session_id: &SessionId, chunk: &str) {
        self.bus.data(session_id, chunk);
    }

    /// Publish a process exit for `session_id`.
    pub fn emit_exit(&self, session_id: &SessionId, code: i32) {
        self.bus.exit(session_id, code);
    }

    pub fn calls(&self) -> Vec<IpcCall> {
        lock(&self.calls).clone()
    }

    pub fn creates(&self) -> Vec<(SessionId, CreateOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IpcCall::Create {
                    session_id,
                    options,
                } => Some((session_id, options)),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self, id: &SessionId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IpcCall::Write { session_id, data } if &session_id == id => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn resizes(&self, id: &SessionId) -> Vec<(u16, u16)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IpcCall::Resize {
                    session_id,
                    cols,
                    rows,
                } if &session_id == id => Some((cols, rows)),
                _ => None,
            })
            .collect()
    }

    pub fn kills(&self) -> Vec<SessionId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IpcCall::Kill { session_id } => Some(session_id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: IpcCall) {
        lock(&self.calls).push(call);
    }
}

impl Default for RecordingIpc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PtyIpc for RecordingIpc {
    async fn create(
        &self,
        session_id: &SessionId,
        options: CreateOptions,
    ) -> Result<SpawnInfo, TermError> {
        self.record(IpcCall::Create {
            session_id: session_id.clone(),
            options,
        });

        loop {
            let opened = self.gate.notified();
            if self.creates_open.load(Ordering::SeqCst) {
                break;
            }
            opened.await;
        }

        if let Some(message) = lock(&self.create_failure).clone() {
            return Err(TermError::Pty(message));
        }
        Ok(SpawnInfo {
            pid: Some(self.next_pid.fetch_add(1, Ordering::Relaxed)),
        })
    }

    fn write(&self, session_id: &SessionId, data: &str) {
        self.record(IpcCall::Write {
            session_id: session_id.clone(),
            data: data.to_string(),
        });
    }

    fn resize(&self, session_id: &SessionId, cols: u16, rows: u16) {
        self.record(IpcCall::Resize {
            session_id: session_id.clone(),
            cols,
            rows,
        });
    }

    fn kill(&self, session_id: &SessionId) {
        self.record(IpcCall::Kill {
            session_id: session_id.clone(),
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<PtyEvent> {
        self.bus.subscribe()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
