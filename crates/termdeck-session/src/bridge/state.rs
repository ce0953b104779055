use serde::Serialize;

/// Process lifecycle as seen by one bridge.
///
/// `Uninitialized -> Creating -> Ready -> Exited`. A failed creation stays
/// in `Creating`; nothing retries it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BridgeState {
    #[default]
    Uninitialized,
    Creating,
    Ready,
    Exited,
}

impl BridgeState {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}
