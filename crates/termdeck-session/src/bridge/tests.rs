use std::sync::Arc;
use std::time::Duration;

use termdeck_common::{ContainerId, Rect, SessionId};
use termdeck_terminal::{Attachment, EngineOptions, InstanceManager};

use super::*;
use crate::ipc::RecordingIpc;
use crate::registry::{NewSession, SessionRegistry, SessionStatus};

// 800x480 px with 10x20 cells and no padding fits 80x24.
const BOUNDS: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 480.0,
};

struct Harness {
    registry: SessionRegistry,
    ipc: Arc<RecordingIpc>,
}

impl Harness {
    fn new() -> Self {
        let ipc = Arc::new(RecordingIpc::new());
        let instances = Arc::new(InstanceManager::new(EngineOptions {
            scrollback_lines: 200,
            cell_width: 10.0,
            cell_height: 20.0,
            padding: 0.0,
            initial_cols: 40,
            initial_rows: 10,
            ..EngineOptions::default()
        }));
        let registry = SessionRegistry::new(ipc.clone(), instances, "/home/user".into());
        Self { registry, ipc }
    }

    fn session(&self, cwd: &str) -> (SessionId, PtyBridge) {
        let id = self
            .registry
            .add_session(NewSession {
                cwd: Some(cwd.into()),
                ..Default::default()
            })
            .unwrap();
        let bridge = PtyBridge::new(self.registry.clone(), id.clone(), Duration::ZERO);
        (id, bridge)
    }

    fn instances(&self) -> &Arc<InstanceManager> {
        self.registry.instances()
    }

    fn contents(&self, id: &SessionId) -> String {
        self.instances().contents(id).unwrap_or_default()
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

/// Give spawned tasks a chance to run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn first_mount_creates_process_then_resizes_once() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    assert_eq!(bridge.state(), BridgeState::Uninitialized);

    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;
    wait_until(|| !h.ipc.resizes(&id).is_empty()).await;

    let creates = h.ipc.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].0, id);
    assert_eq!(creates[0].1.cwd, "/repo");
    assert_eq!(creates[0].1.shell, None);
    assert!(h.registry.get(&id).unwrap().pty_created);
    assert_eq!(h.ipc.resizes(&id), vec![(80, 24)]);
}

#[tokio::test]
async fn repeated_mounts_while_creating_issue_one_create() {
    let h = Harness::new();
    h.ipc.hold_creates();
    let (_id, bridge) = h.session("/repo");

    let first = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    settle().await;
    assert_eq!(bridge.state(), BridgeState::Creating);
    drop(first);

    let _second = bridge.mount(ContainerId(2), BOUNDS).unwrap();
    let _third = bridge.mount(ContainerId(3), BOUNDS).unwrap();
    settle().await;
    assert_eq!(h.ipc.creates().len(), 1);

    h.ipc.release_creates();
    wait_until(|| bridge.state() == BridgeState::Ready).await;
    assert_eq!(h.ipc.creates().len(), 1);
}

#[tokio::test]
async fn mount_after_creation_skips_create_and_resizes_once() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| !h.ipc.resizes(&id).is_empty()).await;
    mount.unmount();
    h.ipc.clear_calls();

    let _mount = bridge.mount(ContainerId(2), Rect::sized(600.0, 200.0)).unwrap();
    settle().await;

    assert!(h.ipc.creates().is_empty());
    assert_eq!(h.ipc.resizes(&id), vec![(60, 10)]);
}

#[tokio::test]
async fn creation_failure_writes_error_and_never_retries() {
    let h = Harness::new();
    h.ipc.fail_creates_with("no such shell");
    let (id, bridge) = h.session("/repo");

    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| h.contents(&id).contains("[Error]")).await;
    assert!(h.contents(&id).contains("no such shell"));
    assert_eq!(bridge.state(), BridgeState::Creating);
    assert!(!h.registry.get(&id).unwrap().pty_created);
    assert!(h.ipc.resizes(&id).is_empty());

    mount.unmount();
    let _again = bridge.mount(ContainerId(2), BOUNDS).unwrap();
    settle().await;
    assert_eq!(h.ipc.creates().len(), 1);
}

#[tokio::test]
async fn resize_before_ready_is_deferred_then_flushed() {
    let h = Harness::new();
    h.ipc.hold_creates();
    let (id, bridge) = h.session("/repo");

    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    assert_eq!(h.instances().run_pending_fits(), 1);
    assert_eq!(bridge.pending_resize(), Some((80, 24)));
    assert!(h.ipc.resizes(&id).is_empty());

    // Hidden before creation completes: the deferred size is what gets sent.
    mount.unmount();
    h.ipc.release_creates();
    wait_until(|| !h.ipc.resizes(&id).is_empty()).await;

    assert_eq!(h.ipc.resizes(&id), vec![(80, 24)]);
    assert_eq!(bridge.pending_resize(), None);
}

#[tokio::test]
async fn resize_when_ready_is_forwarded() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| !h.ipc.resizes(&id).is_empty()).await;

    h.instances().run_pending_fits();
    h.instances()
        .resize_container(&id, Rect::sized(1000.0, 600.0));
    assert_eq!(h.ipc.resizes(&id).last(), Some(&(100, 30)));
}

#[tokio::test]
async fn completion_after_removal_is_tolerated() {
    let h = Harness::new();
    h.ipc.hold_creates();
    let (id, bridge) = h.session("/repo");
    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    settle().await;

    drop(mount);
    h.registry.remove_session(&id);
    h.ipc.release_creates();
    settle().await;

    assert!(h.registry.get(&id).is_none());
    assert!(!h.instances().contains(&id));
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn engine_input_is_written_verbatim() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    h.instances().input(&id, "ls\n");
    h.instances().input(&id, "\x1b[A");
    assert_eq!(h.ipc.writes(&id), vec!["ls\n".to_string(), "\x1b[A".to_string()]);
}

#[tokio::test]
async fn title_changes_update_registry() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();

    h.ipc.emit_data(&id, "\x1b]0;vim main.rs\x07");
    wait_until(|| h.registry.get(&id).is_some_and(|s| s.title == "vim main.rs")).await;
}

#[tokio::test]
async fn output_flows_while_unmounted() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;
    mount.unmount();

    h.ipc.emit_data(&id, "built while hidden\r\n");
    wait_until(|| h.contents(&id).contains("built while hidden")).await;
    assert!(matches!(
        h.instances().attachment(&id),
        Some(Attachment::Detached { .. })
    ));
}

#[tokio::test]
async fn output_for_other_sessions_is_ignored() {
    let h = Harness::new();
    let (a, _bridge_a) = h.session("/a");
    let (b, _bridge_b) = h.session("/b");
    h.instances().create(&a);
    h.instances().create(&b);

    h.ipc.emit_data(&a, "only-for-a");
    wait_until(|| h.contents(&a).contains("only-for-a")).await;
    settle().await;
    assert!(!h.contents(&b).contains("only-for-a"));
}

#[tokio::test]
async fn exit_writes_trailer_once() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    h.ipc.emit_exit(&id, 2);
    h.ipc.emit_exit(&id, 9);
    wait_until(|| bridge.state() == BridgeState::Exited).await;
    settle().await;

    let contents = h.contents(&id);
    assert_eq!(contents.matches("[Process exited with code").count(), 1);
    assert!(contents.contains("[Process exited with code 2]"));
    let status = h.registry.get(&id).unwrap().status();
    assert_eq!(status, SessionStatus::Exited(2));
    assert!(!status.is_success());
}

#[tokio::test]
async fn removal_stops_routing() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    h.registry.remove_session(&id);
    h.ipc.emit_data(&id, "late output");
    settle().await;

    assert_eq!(h.ipc.kills(), vec![id.clone()]);
    assert!(!h.instances().contains(&id));
}

// =============================================================================
// Mounts
// =============================================================================

#[tokio::test]
async fn unmount_detaches_without_kill_or_destroy() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    mount.unmount();
    assert!(h.instances().contains(&id));
    assert!(h.ipc.kills().is_empty());
    assert_eq!(
        h.instances().attachment(&id),
        Some(Attachment::Detached { last: ContainerId(1) })
    );

    // Input no longer routed once the mount is gone.
    h.instances().input(&id, "ignored");
    assert!(h.ipc.writes(&id).is_empty());
}

#[tokio::test]
async fn stale_mount_drop_keeps_newer_attachment() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let old = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    let _new = bridge.mount(ContainerId(2), BOUNDS).unwrap();

    drop(old);
    assert!(matches!(
        h.instances().attachment(&id),
        Some(Attachment::Attached { container: ContainerId(2), .. })
    ));
}

#[tokio::test]
async fn reattach_preserves_scrollback() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    for n in 0..40 {
        h.ipc.emit_data(&id, &format!("line {n}\r\n"));
    }
    wait_until(|| h.contents(&id).contains("line 39")).await;
    let history = h.instances().history_len(&id);
    assert!(history > 0);

    mount.unmount();
    let _mount = bridge.mount(ContainerId(2), BOUNDS).unwrap();
    assert_eq!(h.instances().len(), 1);
    assert_eq!(h.instances().history_len(&id), history);
    assert!(h
        .instances()
        .buffer_lines(&id)
        .iter()
        .any(|line| line == "line 0"));
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn repo_session_runs_ls_and_exits_cleanly() {
    let h = Harness::new();
    let (id, bridge) = h.session("/repo");
    let _mount = bridge.mount(ContainerId(1), BOUNDS).unwrap();
    wait_until(|| bridge.state() == BridgeState::Ready).await;

    assert_eq!(h.ipc.creates()[0].1.cwd, "/repo");

    h.instances().input(&id, "ls\n");
    assert_eq!(h.ipc.writes(&id), vec!["ls\n".to_string()]);

    h.ipc.emit_data(&id, "Cargo.toml  src\r\n");
    h.ipc.emit_exit(&id, 0);
    wait_until(|| bridge.state() == BridgeState::Exited).await;

    let contents = h.contents(&id);
    assert!(contents.contains("Cargo.toml  src"));
    assert!(contents.contains("[Process exited with code 0]"));
    let status = h.registry.get(&id).unwrap().status();
    assert_eq!(status, SessionStatus::Exited(0));
    assert!(status.is_success());
}
