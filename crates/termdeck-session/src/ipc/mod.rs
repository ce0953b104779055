//! The IPC surface between sessions and the process host.
//!
//! `create` is request/response; `write`, `resize` and `kill` are
//! fire-and-forget. Output and exit notifications for every session arrive
//! on one tagged broadcast channel.

mod wire;

#[cfg(any(test, feature = "test-support"))]
mod recording;

pub use wire::{is_inbound_kind, is_outbound_kind, IpcMessage, PtyRequest};

#[cfg(any(test, feature = "test-support"))]
pub use recording::{IpcCall, RecordingIpc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use termdeck_common::{PtyEvent, SessionId, TermError};
use tokio::sync::broadcast;

/// Options for spawning a session's process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    pub cwd: String,
    /// Shell program. `None` uses the configured or detected default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

/// What the host reports after a successful spawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnInfo {
    pub pid: Option<u32>,
}

/// Process host contract.
#[async_trait]
pub trait PtyIpc: Send + Sync {
    /// Spawn the process for `session_id`.
    async fn create(
        &self,
        session_id: &SessionId,
        options: CreateOptions,
    ) -> Result<SpawnInfo, TermError>;

    /// Send input bytes verbatim.
    fn write(&self, session_id: &SessionId, data: &str);

    fn resize(&self, session_id: &SessionId, cols: u16, rows: u16);

    fn kill(&self, session_id: &SessionId);

    /// Output and exit events for every session, in emission order.
    fn subscribe(&self) -> broadcast::Receiver<PtyEvent>;
}

/// Run a decoded request against `ipc`.
///
/// `pty_create` always gets a `pty_created` reply, with `success: false`
/// and the error when spawning failed. Other requests have no reply.
pub async fn dispatch(ipc: &dyn PtyIpc, request: PtyRequest) -> Option<IpcMessage> {
    match request {
        PtyRequest::Create {
            session_id,
            options,
        } => match ipc.create(&session_id, options).await {
            Ok(info) => Some(IpcMessage::created(&session_id, &info)),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "pty_create failed");
                Some(IpcMessage::create_failed(&session_id, &e.to_string()))
            }
        },
        PtyRequest::Write { session_id, data } => {
            ipc.write(&session_id, &data);
            None
        }
        PtyRequest::Resize {
            session_id,
            cols,
            rows,
        } => {
            ipc.resize(&session_id, cols, rows);
            None
        }
        PtyRequest::Kill { session_id } => {
            ipc.kill(&session_id);
            None
        }
    }
}
