//! Terminal sessions: the registry, the per-session PTY bridge, the IPC
//! contract to the process host, and an in-process host built on
//! `portable-pty`.

pub mod bridge;
pub mod host;
pub mod ipc;
pub mod registry;

pub use bridge::{exit_trailer, BridgeState, Mount, PtyBridge};
pub use host::{PtyError, PtyHost};
pub use ipc::{dispatch, CreateOptions, IpcMessage, PtyIpc, PtyRequest, SpawnInfo};
pub use registry::{NewSession, SessionRegistry, SessionStatus, TerminalSession};

#[cfg(any(test, feature = "test-support"))]
pub use ipc::{IpcCall, RecordingIpc};
