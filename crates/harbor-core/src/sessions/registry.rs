use std::collections::HashMap;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::MultitaskConfig;
use crate::launcher::{ProcessLauncher, RequestToken};
use crate::sessions::errors::SessionError;
use crate::sessions::events::LifecycleEvent;
use crate::sessions::session::Session;
use crate::sessions::types::SessionSnapshot;
use crate::window::{Rect, Size, WindowDecoration};

const DEFAULT_WINDOW_SIZE: Size = Size {
    width: 640.0,
    height: 480.0,
};

/// Offset between successive default window placements.
const CASCADE_STEP: f64 = 32.0;

/// Process-wide table of active sessions, keyed by session id.
///
/// The registry is the single writer of the session collection; readers
/// take point-in-time snapshots via [`SessionRegistry::list_active`].
/// Keying by session id enforces at most one live session per id. All
/// asynchronous callbacks (interruptions) are applied here, on the
/// owning context, via [`SessionRegistry::handle_interruption`].
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    events: broadcast::Sender<LifecycleEvent>,
    bounds: Rect,
    multitask: MultitaskConfig,
    placement_slot: usize,
}

impl SessionRegistry {
    pub fn new(multitask: MultitaskConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        let bounds = Rect::from_size(Size::new(
            multitask.display_width,
            multitask.display_height,
        ));
        Self {
            sessions: HashMap::new(),
            events,
            bounds,
            multitask,
            placement_slot: 0,
        }
    }

    /// Subscribe to lifecycle events for all sessions in this registry.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// The host's presentable bounds, as handed to every window.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Return the existing session for `session_id`, or construct a new
    /// `Idle` one with a freshly placed window.
    ///
    /// An existing session is returned whatever its state; callers decide
    /// whether to bring it to front, restart it, or remove it first.
    pub fn get_or_create(
        &mut self,
        session_id: &str,
        bundle_id: &str,
        container_id: &str,
        display_name: &str,
    ) -> &mut Session {
        if !self.sessions.contains_key(session_id) {
            let window = WindowDecoration::new(
                session_id,
                display_name,
                self.next_placement(),
                self.bounds,
            );
            let mut session = Session::new(
                session_id.to_string(),
                bundle_id.to_string(),
                container_id.to_string(),
                window,
                self.multitask.background_on_minimize,
                self.events.clone(),
            );
            if self.multitask.launch_maximized {
                session.toggle_maximize();
            }
            info!(
                event = "core.registry.session_created",
                session_id = session_id,
                bundle_id = bundle_id,
                container_id = container_id,
            );
            self.sessions.insert(session_id.to_string(), session);
        }
        self.sessions
            .get_mut(session_id)
            .expect("session inserted above")
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    /// Point-in-time snapshots of every session, sorted by session id.
    /// Never blocks on process IO.
    pub fn list_active(&self) -> Vec<SessionSnapshot> {
        let mut snapshots: Vec<SessionSnapshot> =
            self.sessions.values().map(Session::snapshot).collect();
        snapshots.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        snapshots
    }

    /// Remove a terminated session, releasing its window decoration.
    ///
    /// Fails with `SessionStillLive` for any non-terminated session:
    /// removing one would silently orphan a running guest process.
    pub fn remove(&mut self, session_id: &str) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.to_string(),
            })?;

        if !session.state().is_terminal() {
            return Err(SessionError::SessionStillLive {
                session_id: session_id.to_string(),
                state: session.state(),
            });
        }

        self.sessions.remove(session_id);
        info!(event = "core.registry.session_removed", session_id = session_id);
        Ok(())
    }

    /// Apply an interruption notification to the session owning `token`.
    ///
    /// Returns the session id when a session matched. Tokens from
    /// already-removed or restarted sessions are ignored.
    pub fn handle_interruption(&mut self, token: RequestToken) -> Option<String> {
        let session = self
            .sessions
            .values_mut()
            .find(|s| s.request_token() == Some(token))?;
        let session_id = session.session_id().to_string();
        debug!(
            event = "core.registry.interruption_dispatched",
            session_id = session_id,
            token = %token,
        );
        session.handle_interruption();
        Some(session_id)
    }

    /// Request termination of every live session.
    pub fn terminate_all(&mut self, launcher: &ProcessLauncher) {
        for session in self.sessions.values_mut() {
            session.terminate(launcher);
        }
    }

    /// Whether any session may still own a guest process.
    pub fn has_live_sessions(&self) -> bool {
        self.sessions.values().any(|s| s.state().is_live())
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Cascaded default placement so concurrently opened windows do not
    /// stack exactly on top of each other.
    fn next_placement(&mut self) -> Rect {
        let steps_x = ((self.bounds.size.width - DEFAULT_WINDOW_SIZE.width) / CASCADE_STEP)
            .max(1.0) as usize;
        let steps_y = ((self.bounds.size.height - DEFAULT_WINDOW_SIZE.height) / CASCADE_STEP)
            .max(1.0) as usize;
        let slot = self.placement_slot;
        self.placement_slot += 1;
        Rect {
            origin: crate::window::Point::new(
                ((slot % steps_x) as f64) * CASCADE_STEP,
                ((slot % steps_y) as f64) * CASCADE_STEP,
            ),
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::LauncherError;
    use crate::launcher::fake::FakeExtensionHost;
    use crate::launcher::{InterruptionReceiver, ProcessLauncher};
    use crate::sessions::types::SessionState;
    use crate::window::WindowMode;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const SID: &str = "com.example.guest:default";
    const UNEXPECTED_EXIT_STR: &str = "guest process exited unexpectedly";

    struct Harness {
        registry: SessionRegistry,
        launcher: ProcessLauncher,
        host: Arc<FakeExtensionHost>,
        interruptions: InterruptionReceiver,
    }

    fn harness() -> Harness {
        harness_with(MultitaskConfig::default())
    }

    fn harness_with(multitask: MultitaskConfig) -> Harness {
        let (tx, interruptions) = mpsc::unbounded_channel();
        let host = FakeExtensionHost::new(tx);
        let launcher = ProcessLauncher::with_timeouts(
            host.clone(),
            Duration::from_millis(100),
            Duration::from_millis(5),
        );
        Harness {
            registry: SessionRegistry::new(multitask),
            launcher,
            host,
            interruptions,
        }
    }

    impl Harness {
        async fn start_running(&mut self, session_id: &str, pid: u32) {
            self.host.set_auto_pid(pid);
            let session =
                self.registry
                    .get_or_create(session_id, "com.example.guest", "default", "Guest");
            session.start(&self.launcher).unwrap();
            session.complete_launch(&self.launcher).await.unwrap();
        }

        /// Drain re-dispatched interruption notifications onto the
        /// registry, the way the host loop does.
        fn pump_interruptions(&mut self) {
            while let Ok(token) = self.interruptions.try_recv() {
                self.registry.handle_interruption(token);
            }
        }
    }

    #[tokio::test]
    async fn test_start_resolves_pid_and_runs() {
        // Launch succeeds and pid 4321 resolves within the timeout.
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get(SID).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.pid().map(|p| p.as_u32()), Some(4321));
        assert_eq!(session.window().mode(), WindowMode::Normal);
    }

    #[tokio::test]
    async fn test_launch_timeout_terminates_with_error() {
        // No pid is ever observed, so the launch times out.
        let mut h = harness();
        let session = h
            .registry
            .get_or_create(SID, "com.example.guest", "default", "Guest");
        session.start(&h.launcher).unwrap();

        let result = session.complete_launch(&h.launcher).await;
        assert!(matches!(
            result,
            Err(SessionError::LauncherError {
                source: LauncherError::LaunchTimeout { .. }
            })
        ));

        let session = h.registry.get(SID).unwrap();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(session.last_error().unwrap().contains("within"));
        assert_eq!(session.window().mode(), WindowMode::Closed);
        assert!(session.pid().is_none());
    }

    #[tokio::test]
    async fn test_launch_denied_terminates_with_error() {
        let mut h = harness();
        h.host.deny("com.example.guest");
        let session = h
            .registry
            .get_or_create(SID, "com.example.guest", "default", "Guest");

        let result = session.start(&h.launcher);
        assert!(matches!(
            result,
            Err(SessionError::LauncherError {
                source: LauncherError::LaunchDenied { .. }
            })
        ));
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.window().mode(), WindowMode::Closed);
    }

    #[tokio::test]
    async fn test_interruption_closes_window_with_unexpected_exit_flag() {
        // A running guest crashes; the interruption callback arrives with
        // its token and nothing else.
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let token = h.registry.get(SID).unwrap().request_token().unwrap();
        h.host.send_interruption(token);
        h.pump_interruptions();

        let session = h.registry.get(SID).unwrap();
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.window().mode(), WindowMode::Closed);
        assert!(session.window().exited_unexpectedly());
        assert_eq!(session.last_error(), Some(UNEXPECTED_EXIT_STR));
    }

    #[tokio::test]
    async fn test_requested_terminate_is_not_flagged_unexpected() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.terminate(&h.launcher);
        assert_eq!(session.state(), SessionState::Terminating);

        h.pump_interruptions();

        let session = h.registry.get(SID).unwrap();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(!session.window().exited_unexpectedly());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_terminate_twice_is_idempotent() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let mut events = h.registry.subscribe();
        let session = h.registry.get_mut(SID).unwrap();
        session.terminate(&h.launcher);
        session.terminate(&h.launcher);
        h.pump_interruptions();
        let session = h.registry.get_mut(SID).unwrap();
        session.terminate(&h.launcher);

        assert_eq!(session.state(), SessionState::Terminated);

        // Exactly one Terminating and one Terminated event.
        let mut terminating = 0;
        let mut terminated = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                LifecycleEvent::Terminating { .. } => terminating += 1,
                LifecycleEvent::Terminated { .. } => terminated += 1,
                _ => {}
            }
        }
        assert_eq!(terminating, 1);
        assert_eq!(terminated, 1);
    }

    #[tokio::test]
    async fn test_terminate_during_launch_cancels_cleanly() {
        let mut h = harness();
        let session = h
            .registry
            .get_or_create(SID, "com.example.guest", "default", "Guest");
        session.start(&h.launcher).unwrap();
        assert_eq!(session.state(), SessionState::Launching);

        session.terminate(&h.launcher);
        assert_eq!(session.state(), SessionState::Terminating);

        // A pid arriving after cancellation must not resurrect the launch.
        let token = session.request_token().unwrap();
        h.host.resolve_pid(token, 9999);
        let session = h.registry.get_mut(SID).unwrap();
        session.complete_launch(&h.launcher).await.unwrap();
        assert_eq!(session.state(), SessionState::Terminating);

        h.pump_interruptions();
        let session = h.registry.get(SID).unwrap();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(session.pid().is_none());
    }

    #[tokio::test]
    async fn test_start_while_running_fails() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        let result = session.start(&h.launcher);
        assert!(matches!(result, Err(SessionError::AlreadyRunning { .. })));
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_restart_after_terminated() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let token = h.registry.get(SID).unwrap().request_token().unwrap();
        h.host.send_interruption(token);
        h.pump_interruptions();

        h.host.set_auto_pid(5555);
        let session = h.registry.get_mut(SID).unwrap();
        session.start(&h.launcher).unwrap();
        session.complete_launch(&h.launcher).await.unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.pid().map(|p| p.as_u32()), Some(5555));
        assert_ne!(session.request_token(), Some(token));
        assert_eq!(session.window().mode(), WindowMode::Normal);
        assert!(!session.window().exited_unexpectedly());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing_session() {
        // Registry invariant: one session per session id, so two launches
        // of the same id can never be Running/Launching concurrently.
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let before = h.registry.len();
        let session = h
            .registry
            .get_or_create(SID, "com.example.guest", "default", "Guest");
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(h.registry.len(), before);
    }

    #[tokio::test]
    async fn test_remove_live_session_fails() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let result = h.registry.remove(SID);
        assert!(matches!(result, Err(SessionError::SessionStillLive { .. })));
        assert_eq!(h.registry.len(), 1);

        let session = h.registry.get_mut(SID).unwrap();
        session.terminate(&h.launcher);
        h.pump_interruptions();

        h.registry.remove(SID).unwrap();
        assert!(h.registry.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_session_fails() {
        let mut h = harness();
        assert!(matches!(
            h.registry.remove("missing"),
            Err(SessionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_events_in_order_nothing_after_terminated() {
        let mut h = harness();
        let mut events = h.registry.subscribe();

        h.start_running(SID, 4321).await;
        let session = h.registry.get_mut(SID).unwrap();
        session.notify_backgrounded();
        session.notify_foregrounded();
        session.terminate(&h.launcher);
        h.pump_interruptions();

        // Late notifications after Terminated are dropped.
        let session = h.registry.get_mut(SID).unwrap();
        session.notify_backgrounded();
        session.notify_foregrounded();

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        let id = SID.to_string();
        assert_eq!(
            seen,
            vec![
                LifecycleEvent::LaunchStarted {
                    session_id: id.clone()
                },
                LifecycleEvent::Running {
                    session_id: id.clone(),
                    pid: 4321
                },
                LifecycleEvent::Backgrounded {
                    session_id: id.clone()
                },
                LifecycleEvent::Foregrounded {
                    session_id: id.clone()
                },
                LifecycleEvent::Terminating {
                    session_id: id.clone()
                },
                LifecycleEvent::Terminated {
                    session_id: id,
                    error: None
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_background_notifications_disabled_skips_backgrounded() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.set_background_notifications_enabled(false);
        session.notify_backgrounded();
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_minimize_requests_backgrounding_when_notifications_enabled() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.minimize_window().unwrap();
        assert_eq!(session.window().mode(), WindowMode::Minimized);
        assert_eq!(session.state(), SessionState::Backgrounded);

        session.restore_window().unwrap();
        assert_eq!(session.window().mode(), WindowMode::Normal);
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_minimize_with_notifications_disabled_keeps_running() {
        // Default policy: background_on_minimize = false.
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.set_background_notifications_enabled(false);
        session.minimize_window().unwrap();
        assert_eq!(session.window().mode(), WindowMode::Minimized);
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_minimize_with_background_on_minimize_policy() {
        // Configured policy: minimize requests backgrounding even with
        // notifications disabled.
        let multitask = MultitaskConfig {
            background_on_minimize: true,
            ..MultitaskConfig::default()
        };
        let mut h = harness_with(multitask);
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.set_background_notifications_enabled(false);
        session.minimize_window().unwrap();
        assert_eq!(session.state(), SessionState::Backgrounded);
    }

    #[tokio::test]
    async fn test_close_window_terminates_and_retains_terminal_record() {
        let mut h = harness();
        h.start_running(SID, 4321).await;

        let session = h.registry.get_mut(SID).unwrap();
        session.close_window(&h.launcher);
        assert_eq!(session.window().mode(), WindowMode::Closed);
        assert_eq!(session.state(), SessionState::Terminating);

        h.pump_interruptions();
        let snapshot = &h.registry.list_active()[0];
        assert_eq!(snapshot.state, SessionState::Terminated);
        assert_eq!(snapshot.window_mode, WindowMode::Closed);
        assert!(!snapshot.exited_unexpectedly);
    }

    #[tokio::test]
    async fn test_launch_maximized_config() {
        let multitask = MultitaskConfig {
            launch_maximized: true,
            ..MultitaskConfig::default()
        };
        let mut h = harness_with(multitask);
        let session = h
            .registry
            .get_or_create(SID, "com.example.guest", "default", "Guest");
        assert_eq!(session.window().mode(), WindowMode::Maximized);
    }

    #[tokio::test]
    async fn test_multiple_sessions_cascade_placement() {
        let mut h = harness();
        h.start_running("com.example.guest:a", 100).await;
        h.start_running("com.example.guest:b", 200).await;

        let snapshots = h.registry.list_active();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots.iter().all(|s| s.state == SessionState::Running));

        let a = h.registry.get("com.example.guest:a").unwrap().window().frame();
        let b = h.registry.get("com.example.guest:b").unwrap().window().frame();
        assert_ne!(a.origin, b.origin);
    }

    #[tokio::test]
    async fn test_terminate_all() {
        let mut h = harness();
        h.start_running("com.example.guest:a", 100).await;
        h.start_running("com.example.guest:b", 200).await;

        h.registry.terminate_all(&h.launcher);
        h.pump_interruptions();

        assert!(!h.registry.has_live_sessions());
        assert!(
            h.registry
                .list_active()
                .iter()
                .all(|s| s.state == SessionState::Terminated)
        );
    }
}
