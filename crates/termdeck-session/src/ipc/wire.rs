//! JSON wire format: `{ "kind": ..., "payload": { ... } }` envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use termdeck_common::{PtyEvent, SessionId, TermError};
use termdeck_terminal::MAX_DIMENSION;

use super::{CreateOptions, SpawnInfo};

// =============================================================================
// ALLOWLISTS
// =============================================================================

/// Request kinds a client may send. Anything else is rejected.
const INBOUND_KINDS: &[&str] = &["pty_create", "pty_write", "pty_resize", "pty_kill"];

/// Notification kinds the host sends back.
const OUTBOUND_KINDS: &[&str] = &["pty_data", "pty_exit", "pty_created"];

pub fn is_inbound_kind(kind: &str) -> bool {
    INBOUND_KINDS.contains(&kind)
}

pub fn is_outbound_kind(kind: &str) -> bool {
    OUTBOUND_KINDS.contains(&kind)
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcMessage {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl IpcMessage {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"kind\":\"{}\"}}", self.kind))
    }

    /// `pty_data` / `pty_exit` notification for a host event.
    pub fn from_event(event: &PtyEvent) -> Self {
        match event {
            PtyEvent::Data { session_id, chunk } => Self::new(
                "pty_data",
                json!({ "session_id": session_id, "chunk": chunk }),
            ),
            PtyEvent::Exit { session_id, code } => Self::new(
                "pty_exit",
                json!({ "session_id": session_id, "code": code }),
            ),
        }
    }

    /// Successful `pty_create` reply.
    pub fn created(session_id: &SessionId, info: &SpawnInfo) -> Self {
        Self::new(
            "pty_created",
            json!({ "session_id": session_id, "success": true, "pid": info.pid }),
        )
    }

    /// Failed `pty_create` reply. Carries no pid.
    pub fn create_failed(session_id: &SessionId, error: &str) -> Self {
        Self::new(
            "pty_created",
            json!({ "session_id": session_id, "success": false, "error": error }),
        )
    }

    /// Decode an outbound notification back into a host event.
    /// `pty_created` has no event counterpart.
    pub fn to_event(&self) -> Option<PtyEvent> {
        let session_id = SessionId::from(str_field(&self.payload, "session_id")?);
        match self.kind.as_str() {
            "pty_data" => Some(PtyEvent::Data {
                session_id,
                chunk: str_field(&self.payload, "chunk")?.to_string(),
            }),
            "pty_exit" => Some(PtyEvent::Exit {
                session_id,
                code: i32::try_from(self.payload.get("code")?.as_i64()?).ok()?,
            }),
            _ => None,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// A validated inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyRequest {
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

impl PtyRequest {
    /// Parse and validate a raw JSON request.
    ///
    /// Rejections are logged and returned as `TermError::Ipc`.
    pub fn parse(body: &str) -> Result<Self, TermError> {
        let Some(msg) = IpcMessage::from_json(body) else {
            tracing::warn!(body_len = body.len(), "IPC message rejected: failed to parse");
            return Err(TermError::Ipc("malformed message".into()));
        };
        Self::from_message(&msg).inspect_err(|e| {
            tracing::warn!(kind = %msg.kind, error = %e, "IPC message rejected");
        })
    }

    pub fn from_message(msg: &IpcMessage) -> Result<Self, TermError> {
        if !is_inbound_kind(&msg.kind) {
            return Err(TermError::Ipc(format!("unknown kind '{}'", msg.kind)));
        }
        let payload = &msg.payload;
        let session_id = str_field(payload, "session_id")
            .filter(|id| !id.is_empty())
            .map(SessionId::from)
            .ok_or_else(|| missing(&msg.kind, "session_id"))?;

        match msg.kind.as_str() {
            "pty_create" => Ok(Self::Create {
                session_id,
                options: CreateOptions {
                    cwd: str_field(payload, "cwd")
                        .ok_or_else(|| missing(&msg.kind, "cwd"))?
                        .to_string(),
                    shell: str_field(payload, "shell").map(str::to_string),
                },
            }),
            "pty_write" => Ok(Self::Write {
                session_id,
                data: str_field(payload, "data")
                    .ok_or_else(|| missing(&msg.kind, "data"))?
                    .to_string(),
            }),
            "pty_resize" => {
                let (cols, rows) = extract_size_fields(payload).ok_or_else(|| {
                    TermError::Ipc(format!(
                        "pty_resize: cols/rows missing or outside 1..={MAX_DIMENSION}"
                    ))
                })?;
                Ok(Self::Resize {
                    session_id,
                    cols,
                    rows,
                })
            }
            _ => Ok(Self::Kill { session_id }),
        }
    }

    pub fn to_message(&self) -> IpcMessage {
        match self {
            Self::Create {
                session_id,
                options,
            } => IpcMessage::new(
                "pty_create",
                json!({ "session_id": session_id, "cwd": options.cwd, "shell": options.shell }),
            ),
            Self::Write { session_id, data } => IpcMessage::new(
                "pty_write",
                json!({ "session_id": session_id, "data": data }),
            ),
            Self::Resize {
                session_id,
                cols,
                rows,
            } => IpcMessage::new(
                "pty_resize",
                json!({ "session_id": session_id, "cols": cols, "rows": rows }),
            ),
            Self::Kill { session_id } => {
                IpcMessage::new("pty_kill", json!({ "session_id": session_id }))
            }
        }
    }

    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Create { session_id, .. }
            | Self::Write { session_id, .. }
            | Self::Resize { session_id, .. }
            | Self::Kill { session_id } => session_id,
        }
    }
}

// =============================================================================
// PAYLOAD HELPERS
// =============================================================================

fn str_field<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field)?.as_str()
}

fn missing(kind: &str, field: &str) -> TermError {
    TermError::Ipc(format!("{kind}: missing '{field}' field"))
}

/// Extract `cols` and `rows`, rejecting zero and anything above the cap.
fn extract_size_fields(payload: &Value) -> Option<(u16, u16)> {
    let cols = payload.get("cols")?.as_u64()?;
    let rows = payload.get("rows")?.as_u64()?;
    let max = u64::from(MAX_DIMENSION);
    if cols == 0 || rows == 0 || cols > max || rows > max {
        return None;
    }
    Some((u16::try_from(cols).ok()?, u16::try_from(rows).ok()?))
}

// =============================================================================
// TESTS
// =============================================================================
