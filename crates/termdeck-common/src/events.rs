use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::SessionId;

/// Events published by the PTY host on the single multiplexed channel.
///
/// Every event is tagged with its session id; consumers filter for the
/// sessions they care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PtyEvent {
    Data { session_id: SessionId, chunk: String },
    Exit { session_id: SessionId, code: i32 },
}

impl PtyEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            PtyEvent::Data { session_id, .. } | PtyEvent::Exit { session_id, .. } => session_id,
        }
    }
}

pub struct PtyEventBus {
    sender: broadcast::Sender<PtyEvent>,
}

impl PtyEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PtyEvent> {
        self.sender.subscribe()
    }

    /// Publish to every subscriber. Returns how many received it.
    pub fn publish(&self, event: PtyEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn data(&self, session_id: &SessionId, chunk: impl Into<String>) -> usize {
        self.publish(PtyEvent::Data {
            session_id: session_id.clone(),
            chunk: chunk.into(),
        })
    }

    pub fn exit(&self, session_id: &SessionId, code: i32) -> usize {
        self.publish(PtyEvent::Exit {
            session_id: session_id.clone(),
            code,
        })
    }
}

impl Default for PtyEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
