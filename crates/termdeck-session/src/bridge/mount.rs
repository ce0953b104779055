use std::sync::Arc;

use termdeck_common::{ContainerId, SessionId};
use termdeck_terminal::{Attachment, InstanceManager, Subscription};
use tracing::debug;

/// A session shown in one container.
///
/// Dropping it disposes this mount's routing and hides the surface. The
/// process and the engine instance keep running.
pub struct Mount {
    session_id: SessionId,
    container: ContainerId,
    instances: Arc<InstanceManager>,
    subscription: Option<Subscription>,
}

impl Mount {
    pub(super) fn new(
        session_id: SessionId,
        container: ContainerId,
        instances: Arc<InstanceManager>,
        subscription: Subscription,
    ) -> Self {
        Self {
            session_id,
            container,
            instances,
            subscription: Some(subscription),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn unmount(self) {}
}

impl Drop for Mount {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
        // A newer mount may already own the surface.
        if matches!(
            self.instances.attachment(&self.session_id),
            Some(Attachment::Attached { container, .. }) if container == self.container
        ) {
            self.instances.detach(&self.session_id);
            debug!(session_id = %self.session_id, container = %self.container, "unmounted");
        }
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount")
            .field("session_id", &self.session_id)
            .field("container", &self.container)
            .finish()
    }
}
