//! Events an engine instance emits toward its session, and the listener
//! registry that delivers them.
//!
//! @module terminal/event

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;

// =============================================================================
// TYPES
// =============================================================================

/// Engine events routed to the PTY bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EngineEvent {
    /// User input (keystrokes or a paste) bound for the process.
    Input(String),
    /// The engine grid changed size.
    Resize { cols: u16, rows: u16 },
    /// The process set a new window title.
    TitleChanged(String),
}

pub type Listener = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

type ListenerMap = Mutex<HashMap<u64, Listener>>;

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// LISTENERS
// =============================================================================

/// Listener registry owned by one engine instance.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<ListenerMap>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered until the returned
    /// subscription is dropped or disposed.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let key = NEXT_LISTENER.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner).insert(key, listener);
        Subscription {
            key,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every listener.
    ///
    /// The registry lock is released before any listener runs, so a
    /// listener may subscribe or dispose without deadlocking.
    pub fn emit(&self, event: &EngineEvent) {
        let snapshot: Vec<Listener> = lock(&self.inner).values().cloned().collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener.
    pub fn clear(&self) {
        lock(&self.inner).clear();
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

fn lock(map: &ListenerMap) -> std::sync::MutexGuard<'_, HashMap<u64, Listener>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle for one registered listener. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    key: u64,
    registry: Weak<ListenerMap>,
}

impl Subscription {
    /// Unregister now. Same as dropping.
    pub fn dispose(self) {}

    /// `false` once the owning instance has been destroyed.
    pub fn is_live(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|map| lock(&map).contains_key(&self.key))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(map) = self.registry.upgrade() {
            lock(&map).remove(&self.key);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
