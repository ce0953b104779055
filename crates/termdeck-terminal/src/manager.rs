//! Instance Manager: owns every engine instance, keyed by session id.
//!
//! Instances outlive their surfaces. `detach` only hides an instance; the
//! parser, scrollback and cursor survive until `destroy`. Listeners are
//! always invoked after the instance map lock has been released.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use termdeck_common::{ContainerId, Rect, SessionId, TermError};
use tracing::{debug, info};

use crate::event::{EngineEvent, Listener, Listeners, Subscription};
use crate::instance::{Attachment, EngineInstance, EngineOptions};
use crate::links::Link;

pub struct InstanceManager {
    options: EngineOptions,
    instances: Mutex<HashMap<SessionId, EngineInstance>>,
}

impl InstanceManager {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the instance for `id` if it does not exist yet.
    /// Returns `true` when a new instance was constructed.
    pub fn create(&self, id: &SessionId) -> bool {
        let mut instances = self.lock();
        if instances.contains_key(id) {
            return false;
        }
        instances.insert(
            id.clone(),
            EngineInstance::new(id.clone(), self.options.clone()),
        );
        info!(session_id = %id, "engine instance created");
        true
    }

    /// Bind the instance to `container` and schedule a fit.
    pub fn attach(&self, id: &SessionId, container: ContainerId, bounds: Rect) -> Result<(), TermError> {
        self.with(id, |inst| inst.attach(container, bounds))
            .ok_or_else(|| TermError::UnknownSession(id.clone()))
    }

    /// Hide the instance. Buffer and scrollback are kept.
    pub fn detach(&self, id: &SessionId) {
        self.with(id, EngineInstance::detach);
    }

    /// Dispose the instance and its listeners. Irreversible.
    pub fn destroy(&self, id: &SessionId) -> bool {
        let removed = self.lock().remove(id);
        match removed {
            Some(inst) => {
                inst.listeners().clear();
                info!(session_id = %id, "engine instance destroyed");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attachment(&self, id: &SessionId) -> Option<Attachment> {
        self.with(id, |inst| inst.attachment())
    }

    pub fn subscribe(&self, id: &SessionId, listener: Listener) -> Option<Subscription> {
        self.with(id, |inst| inst.listeners().subscribe(listener))
    }

    // =========================================================================
    // Output
    // =========================================================================

    pub fn write(&self, id: &SessionId, data: &str) {
        self.dispatch(id, |inst| inst.write(data));
    }

    pub fn writeln(&self, id: &SessionId, data: &str) {
        self.write(id, &format!("{data}\r\n"));
    }

    /// Write a colored `[Error] ...` line.
    pub fn write_error(&self, id: &SessionId, message: &str) {
        self.with(id, |inst| inst.write_error(message));
    }

    pub fn clear(&self, id: &SessionId) {
        self.with(id, EngineInstance::clear);
    }

    // =========================================================================
    // Fit
    // =========================================================================

    /// Fit the grid to its container. Returns the new `(cols, rows)` when
    /// they changed. Fit errors are logged and swallowed.
    pub fn fit(&self, id: &SessionId) -> Option<(u16, u16)> {
        let outcome = self.with(id, |inst| {
            inst.fit().map(|event| event.map(|e| (inst.listeners().clone(), e)))
        })?;
        match outcome {
            Ok(Some((listeners, event))) => {
                let dims = match event {
                    EngineEvent::Resize { cols, rows } => Some((cols, rows)),
                    _ => None,
                };
                listeners.emit(&event);
                dims
            }
            Ok(None) => None,
            Err(e) => {
                debug!(session_id = %id, error = %e, "fit skipped");
                None
            }
        }
    }

    pub fn propose_dimensions(&self, id: &SessionId) -> Option<(u16, u16)> {
        self.with(id, |inst| inst.propose_dimensions().ok()).flatten()
    }

    pub fn dimensions(&self, id: &SessionId) -> Option<(u16, u16)> {
        self.with(id, |inst| inst.dimensions())
    }

    /// Run every fit scheduled by `attach`. Call once per paint.
    /// Returns how many instances were fitted.
    pub fn run_pending_fits(&self) -> usize {
        let pending: Vec<SessionId> = self
            .lock()
            .values()
            .filter(|inst| inst.pending_fit())
            .map(|inst| inst.session_id().clone())
            .collect();
        for id in &pending {
            self.fit(id);
        }
        pending.len()
    }

    /// New bounds for the bound container, followed by a fit.
    pub fn resize_container(&self, id: &SessionId, bounds: Rect) -> Option<(u16, u16)> {
        if self.with(id, |inst| inst.set_bounds(bounds)) != Some(true) {
            return None;
        }
        self.fit(id)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// User keystrokes. Leave the engine as an input event.
    pub fn input(&self, id: &SessionId, data: &str) {
        self.dispatch(id, |inst| Some(inst.input(data)));
    }

    pub fn paste(&self, id: &SessionId, text: &str) {
        self.dispatch(id, |inst| Some(inst.paste(text)));
    }

    /// Make `id` the only focused instance. `false` for unknown ids.
    pub fn focus(&self, id: &SessionId) -> bool {
        let mut instances = self.lock();
        if !instances.contains_key(id) {
            return false;
        }
        for (key, inst) in instances.iter_mut() {
            inst.set_focused(key == id);
        }
        true
    }

    pub fn focused(&self) -> Option<SessionId> {
        self.lock()
            .values()
            .find(|inst| inst.is_focused())
            .map(|inst| inst.session_id().clone())
    }

    // =========================================================================
    // Viewport & content
    // =========================================================================

    pub fn scroll_lines(&self, id: &SessionId, delta: isize) {
        self.with(id, |inst| inst.scroll_lines(delta));
    }

    pub fn scroll_to_bottom(&self, id: &SessionId) {
        self.with(id, EngineInstance::scroll_to_bottom);
    }

    pub fn is_at_bottom(&self, id: &SessionId) -> bool {
        self.with(id, |inst| inst.is_at_bottom()).unwrap_or(true)
    }

    pub fn viewport_top(&self, id: &SessionId) -> Option<usize> {
        self.with(id, EngineInstance::viewport_top)
    }

    pub fn history_len(&self, id: &SessionId) -> usize {
        self.with(id, EngineInstance::history_len).unwrap_or(0)
    }

    pub fn contents(&self, id: &SessionId) -> Option<String> {
        self.with(id, |inst| inst.contents())
    }

    pub fn visible_rows(&self, id: &SessionId) -> Vec<String> {
        self.with(id, |inst| inst.visible_rows()).unwrap_or_default()
    }

    pub fn buffer_lines(&self, id: &SessionId) -> Vec<String> {
        self.with(id, EngineInstance::buffer_lines).unwrap_or_default()
    }

    pub fn links(&self, id: &SessionId) -> Vec<Link> {
        self.with(id, |inst| inst.links()).unwrap_or_default()
    }

    // =========================================================================
    // Search & selection
    // =========================================================================

    pub fn find_next(&self, id: &SessionId, term: &str) -> bool {
        self.with(id, |inst| inst.find_next(term)).unwrap_or(false)
    }

    pub fn find_previous(&self, id: &SessionId, term: &str) -> bool {
        self.with(id, |inst| inst.find_previous(term)).unwrap_or(false)
    }

    pub fn clear_search(&self, id: &SessionId) {
        self.with(id, EngineInstance::clear_search);
    }

    /// Selected text, or an empty string when nothing is selected.
    pub fn get_selection(&self, id: &SessionId) -> String {
        self.with(id, EngineInstance::get_selection).unwrap_or_default()
    }

    pub fn select_all(&self, id: &SessionId) {
        self.with(id, EngineInstance::select_all);
    }

    pub fn clear_selection(&self, id: &SessionId) {
        self.with(id, EngineInstance::clear_selection);
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, EngineInstance>> {
        self.instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with<R>(&self, id: &SessionId, f: impl FnOnce(&mut EngineInstance) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    /// Run `f` under the lock, then emit its event with the lock released.
    fn dispatch(&self, id: &SessionId, f: impl FnOnce(&mut EngineInstance) -> Option<EngineEvent>) {
        let pending: Option<(Listeners, EngineEvent)> = self
            .with(id, |inst| f(inst).map(|e| (inst.listeners().clone(), e)))
            .flatten();
        if let Some((listeners, event)) = pending {
            listeners.emit(&event);
        }
    }
}

impl Default for InstanceManager {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn manager() -> InstanceManager {
        InstanceManager::new(EngineOptions {
            scrollback_lines: 200,
            cell_width: 10.0,
            cell_height: 20.0,
            padding: 0.0,
            initial_cols: 20,
            initial_rows: 5,
            ..EngineOptions::default()
        })
    }

    fn record(mgr: &InstanceManager, id: &SessionId) -> (Subscription, Arc<Mutex<Vec<EngineEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = mgr
            .subscribe(id, Arc::new(move |e: &EngineEvent| sink.lock().unwrap().push(e.clone())))
            .unwrap();
        (sub, seen)
    }

    #[test]
    fn create_is_idempotent() {
        let mgr = manager();
        let id = SessionId::from("s1");
        assert!(mgr.create(&id));
        mgr.write(&id, "kept");
        assert!(!mgr.create(&id));
        assert_eq!(mgr.len(), 1);
        assert!(mgr.contents(&id).unwrap().contains("kept"));
    }

    #[test]
    fn reattach_preserves_scrollback() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        mgr.attach(&id, ContainerId(1), Rect::sized(200.0, 100.0)).unwrap();
        for i in 0..50 {
            mgr.writeln(&id, &format!("row {i}"));
        }
        let before = mgr.buffer_lines(&id);

        mgr.detach(&id);
        assert_eq!(mgr.attachment(&id), Some(Attachment::Detached { last: ContainerId(1) }));
        mgr.attach(&id, ContainerId(2), Rect::sized(200.0, 100.0)).unwrap();

        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.buffer_lines(&id), before);
        assert!(mgr.history_len(&id) > 0);
    }

    #[test]
    fn destroy_then_create_is_empty() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        mgr.writeln(&id, "old output");
        assert!(mgr.destroy(&id));
        assert!(!mgr.destroy(&id));

        mgr.create(&id);
        assert!(!mgr.contents(&id).unwrap().contains("old output"));
        assert_eq!(mgr.history_len(&id), 0);
    }

    #[test]
    fn destroy_disposes_listeners() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        let (sub, _) = record(&mgr, &id);
        mgr.destroy(&id);
        assert!(!sub.is_live());
    }

    #[test]
    fn attach_unknown_session_is_an_error() {
        let mgr = manager();
        let err = mgr
            .attach(&SessionId::from("nope"), ContainerId(1), Rect::sized(10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, TermError::UnknownSession(_)));
    }

    #[test]
    fn pending_fit_runs_once_and_emits_resize() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        let (_sub, seen) = record(&mgr, &id);

        mgr.attach(&id, ContainerId(1), Rect::sized(800.0, 480.0)).unwrap();
        assert_eq!(mgr.run_pending_fits(), 1);
        assert_eq!(mgr.run_pending_fits(), 0);

        assert_eq!(mgr.dimensions(&id), Some((80, 24)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EngineEvent::Resize { cols: 80, rows: 24 }]
        );
    }

    #[test]
    fn fit_on_hidden_container_is_swallowed() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        mgr.attach(&id, ContainerId(1), Rect::sized(0.0, 0.0)).unwrap();
        assert_eq!(mgr.fit(&id), None);
        assert_eq!(mgr.dimensions(&id), Some((20, 5)));
    }

    #[test]
    fn propose_dimensions_does_not_apply() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        assert_eq!(mgr.propose_dimensions(&id), None);
        mgr.attach(&id, ContainerId(1), Rect::sized(300.0, 200.0)).unwrap();
        assert_eq!(mgr.propose_dimensions(&id), Some((30, 10)));
        assert_eq!(mgr.dimensions(&id), Some((20, 5)));
    }

    #[test]
    fn resize_container_refits() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        assert_eq!(mgr.resize_container(&id, Rect::sized(300.0, 200.0)), None);
        mgr.attach(&id, ContainerId(1), Rect::sized(300.0, 200.0)).unwrap();
        mgr.run_pending_fits();
        assert_eq!(mgr.resize_container(&id, Rect::sized(500.0, 200.0)), Some((50, 10)));
    }

    #[test]
    fn bottom_anchored_write_follows_output() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        for i in 0..30 {
            mgr.writeln(&id, &format!("row {i}"));
        }
        assert!(mgr.is_at_bottom(&id));
        mgr.writeln(&id, "fresh");
        assert!(mgr.is_at_bottom(&id));
        assert!(mgr.contents(&id).unwrap().contains("fresh"));
    }

    #[test]
    fn scrolled_up_write_does_not_jump() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        for i in 0..30 {
            mgr.writeln(&id, &format!("row {i}"));
        }
        mgr.scroll_lines(&id, -5);
        let top = mgr.viewport_top(&id);

        mgr.writeln(&id, "fresh");

        assert!(!mgr.is_at_bottom(&id));
        assert_eq!(mgr.viewport_top(&id), top);
        assert!(!mgr.contents(&id).unwrap().contains("fresh"));

        mgr.scroll_to_bottom(&id);
        assert!(mgr.contents(&id).unwrap().contains("fresh"));
    }

    #[test]
    fn history_deeper_than_the_screen() {
        let mgr = InstanceManager::default();
        let id = SessionId::from("s1");
        mgr.create(&id);
        assert_eq!(mgr.dimensions(&id), Some((80, 24)));
        mgr.writeln(&id, "needle");
        for i in 0..60 {
            mgr.writeln(&id, &format!("row {i}"));
        }
        assert_eq!(mgr.history_len(&id), 38);

        assert!(mgr.find_next(&id, "needle"));
        assert_eq!(mgr.get_selection(&id), "needle");
        assert_eq!(mgr.viewport_top(&id), Some(0));
        assert_eq!(mgr.visible_rows(&id)[0], "needle");
        assert!(mgr.contents(&id).unwrap().starts_with("needle"));

        mgr.scroll_to_bottom(&id);
        mgr.scroll_lines(&id, -30);
        assert_eq!(mgr.viewport_top(&id), Some(8));
        let rows = mgr.visible_rows(&id);
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0], "row 7");
        assert!(mgr.contents(&id).unwrap().contains("row 30"));

        let lines = mgr.buffer_lines(&id);
        assert_eq!(lines.len(), 62);
        assert_eq!(lines[0], "needle");
        assert_eq!(lines[60], "row 59");
    }

    #[test]
    fn input_and_paste_become_input_events() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        let (_sub, seen) = record(&mgr, &id);

        mgr.input(&id, "ls\r");
        mgr.paste(&id, "echo hi\n");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EngineEvent::Input("ls\r".into()),
                EngineEvent::Input("echo hi\r".into())
            ]
        );
    }

    #[test]
    fn title_changes_are_emitted() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        let (_sub, seen) = record(&mgr, &id);

        mgr.write(&id, "\x1b]0;vim main.rs\x07");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EngineEvent::TitleChanged("vim main.rs".into())]
        );
    }

    #[test]
    fn listener_may_call_back_into_manager() {
        let mgr = Arc::new(manager());
        let id = SessionId::from("s1");
        mgr.create(&id);
        let inner = Arc::clone(&mgr);
        let inner_id = id.clone();
        let _sub = mgr.subscribe(
            &id,
            Arc::new(move |_e: &EngineEvent| {
                inner.writeln(&inner_id, "echoed");
            }),
        );

        mgr.input(&id, "x");

        assert!(mgr.contents(&id).unwrap().contains("echoed"));
    }

    #[test]
    fn focus_is_exclusive() {
        let mgr = manager();
        let a = SessionId::from("a");
        let b = SessionId::from("b");
        mgr.create(&a);
        mgr.create(&b);

        assert!(mgr.focus(&a));
        assert_eq!(mgr.focused(), Some(a.clone()));
        assert!(mgr.focus(&b));
        assert_eq!(mgr.focused(), Some(b));
        assert!(!mgr.focus(&SessionId::from("zz")));
    }

    #[test]
    fn search_and_selection_through_manager() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        mgr.writeln(&id, "error: oops");
        assert!(mgr.find_next(&id, "ERROR"));
        assert_eq!(mgr.get_selection(&id), "error");
        mgr.clear_search(&id);
        assert_eq!(mgr.get_selection(&id), "");
        assert!(!mgr.find_previous(&SessionId::from("zz"), "x"));
    }

    #[test]
    fn clear_drops_history() {
        let mgr = manager();
        let id = SessionId::from("s1");
        mgr.create(&id);
        for i in 0..30 {
            mgr.writeln(&id, &format!("row {i}"));
        }
        mgr.clear(&id);
        assert_eq!(mgr.history_len(&id), 0);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mgr = manager();
        let id = SessionId::from("ghost");
        mgr.write(&id, "x");
        mgr.detach(&id);
        mgr.clear(&id);
        assert!(mgr.is_at_bottom(&id));
        assert_eq!(mgr.get_selection(&id), "");
        assert!(mgr.links(&id).is_empty());
        assert!(mgr.is_empty());
    }
}
