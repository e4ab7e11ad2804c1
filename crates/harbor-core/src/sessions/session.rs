use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::launcher::{LaunchRequest, ProcessLauncher, RequestToken};
use crate::process::Pid;
use crate::sessions::errors::SessionError;
use crate::sessions::events::LifecycleEvent;
use crate::sessions::types::{SessionSnapshot, SessionState};
use crate::window::{Point, Size, WindowDecoration, WindowError};

const UNEXPECTED_EXIT_ERROR: &str = "guest process exited unexpectedly";

/// One guest app instance tied to a window.
///
/// Owns the request token, the process id, the lifecycle state, and the
/// window decoration. All mutation happens on the registry's owning
/// context; asynchronous callbacks reach a session only after being
/// re-dispatched there.
pub struct Session {
    session_id: String,
    bundle_id: String,
    container_id: String,
    state: SessionState,
    token: Option<RequestToken>,
    pid: Option<Pid>,
    last_error: Option<String>,
    background_notifications_enabled: bool,
    /// Request backgrounding on minimize even when background
    /// notifications are disabled (`multitask.background_on_minimize`).
    background_on_minimize: bool,
    window: WindowDecoration,
    created_at: DateTime<Utc>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl Session {
    pub(crate) fn new(
        session_id: String,
        bundle_id: String,
        container_id: String,
        window: WindowDecoration,
        background_on_minimize: bool,
        events: broadcast::Sender<LifecycleEvent>,
    ) -> Self {
        Self {
            session_id,
            bundle_id,
            container_id,
            state: SessionState::Idle,
            token: None,
            pid: None,
            last_error: None,
            background_notifications_enabled: true,
            background_on_minimize,
            window,
            created_at: Utc::now(),
            events,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request_token(&self) -> Option<RequestToken> {
        self.token
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn window(&self) -> &WindowDecoration {
        &self.window
    }

    /// Begin launching the guest.
    ///
    /// Fails with `AlreadyRunning` unless the session is `Idle` or
    /// `Terminated` (a terminated session restarts with a fresh token and a
    /// reopened window). On success the session is `Launching`; callers
    /// drive it to `Running` with [`Session::complete_launch`].
    pub fn start(&mut self, launcher: &ProcessLauncher) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Terminated => {
                self.pid = None;
                self.token = None;
                self.last_error = None;
                self.window.reopen();
            }
            _ => {
                return Err(SessionError::AlreadyRunning {
                    session_id: self.session_id.clone(),
                });
            }
        }

        self.transition(SessionState::Launching);
        self.emit(LifecycleEvent::LaunchStarted {
            session_id: self.session_id.clone(),
        });

        let request = LaunchRequest::new(&self.bundle_id, &self.container_id);
        match launcher.launch(&request) {
            Ok(token) => {
                self.token = Some(token);
                Ok(())
            }
            Err(e) => {
                self.fail_launch(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Wait for the in-flight launch to resolve a process id.
    ///
    /// A no-op unless the session is still `Launching`: a termination
    /// requested mid-launch wins and the interruption path finishes the
    /// teardown. On timeout the launch is cancelled and the session
    /// terminates with the error retained.
    pub async fn complete_launch(&mut self, launcher: &ProcessLauncher) -> Result<(), SessionError> {
        if self.state != SessionState::Launching {
            return Ok(());
        }
        let token = self.token.expect("launching session has a token");

        match launcher.wait_for_process_id(token, &self.bundle_id).await {
            Ok(pid) => {
                self.pid = Some(pid);
                self.transition(SessionState::Running);
                self.emit(LifecycleEvent::Running {
                    session_id: self.session_id.clone(),
                    pid: pid.as_u32(),
                });
                Ok(())
            }
            Err(e) => {
                launcher.interrupt(token);
                self.fail_launch(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Request termination. Always safe: cancels an in-flight launch,
    /// no-ops on a session that is already terminating or terminated.
    /// Completion (`Terminated`) is observed on the lifecycle stream once
    /// the hosting subsystem confirms the exit.
    pub fn terminate(&mut self, launcher: &ProcessLauncher) {
        match self.state {
            SessionState::Terminated | SessionState::Terminating => {}
            SessionState::Idle => {
                // Nothing was ever launched; there is no exit to wait for.
                self.transition(SessionState::Terminating);
                self.emit(LifecycleEvent::Terminating {
                    session_id: self.session_id.clone(),
                });
                self.finish_termination(None);
            }
            SessionState::Launching | SessionState::Running | SessionState::Backgrounded => {
                self.transition(SessionState::Terminating);
                self.emit(LifecycleEvent::Terminating {
                    session_id: self.session_id.clone(),
                });
                if let Some(token) = self.token {
                    launcher.interrupt(token);
                }
            }
        }
    }

    /// Apply an interruption notification for this session's token.
    ///
    /// Reaches the session only via the registry, after re-dispatch onto
    /// the owning context. An interruption that arrives without a prior
    /// termination request is an unexpected exit and is flagged as such on
    /// the window.
    pub(crate) fn handle_interruption(&mut self) {
        match self.state {
            SessionState::Terminated | SessionState::Idle => {}
            SessionState::Terminating => {
                self.finish_termination(None);
            }
            SessionState::Launching | SessionState::Running | SessionState::Backgrounded => {
                warn!(
                    event = "core.session.unexpected_exit",
                    session_id = self.session_id,
                    pid = ?self.pid.map(|p| p.as_u32()),
                );
                self.transition(SessionState::Terminating);
                self.emit(LifecycleEvent::Terminating {
                    session_id: self.session_id.clone(),
                });
                self.window.mark_exited_unexpectedly();
                self.finish_termination(Some(UNEXPECTED_EXIT_ERROR.to_string()));
            }
        }
    }

    /// Toggle delivery of background transition events. While disabled the
    /// guest is assumed to keep running and `Backgrounded` is never
    /// entered from guest notifications.
    pub fn set_background_notifications_enabled(&mut self, enabled: bool) {
        self.background_notifications_enabled = enabled;
    }

    pub fn background_notifications_enabled(&self) -> bool {
        self.background_notifications_enabled
    }

    /// The guest notified the host that it yielded the foreground.
    pub fn notify_backgrounded(&mut self) {
        if !self.background_notifications_enabled {
            return;
        }
        if self.state == SessionState::Running {
            self.transition(SessionState::Backgrounded);
            self.emit(LifecycleEvent::Backgrounded {
                session_id: self.session_id.clone(),
            });
        }
    }

    /// The guest returned to the foreground.
    pub fn notify_foregrounded(&mut self) {
        if self.state == SessionState::Backgrounded {
            self.transition(SessionState::Running);
            self.emit(LifecycleEvent::Foregrounded {
                session_id: self.session_id.clone(),
            });
        }
    }

    /// Minimize the window, requesting session backgrounding per policy:
    /// always when background notifications are enabled, and when they are
    /// disabled only if `multitask.background_on_minimize` is set.
    pub fn minimize_window(&mut self) -> Result<(), WindowError> {
        self.window.minimize()?;
        let request_background =
            self.background_notifications_enabled || self.background_on_minimize;
        if request_background && self.state == SessionState::Running {
            self.transition(SessionState::Backgrounded);
            self.emit(LifecycleEvent::Backgrounded {
                session_id: self.session_id.clone(),
            });
        }
        Ok(())
    }

    /// Restore a minimized window and bring the session back to the
    /// foreground.
    pub fn restore_window(&mut self) -> Result<(), WindowError> {
        self.window.restore()?;
        self.notify_foregrounded();
        Ok(())
    }

    /// Close the window and terminate the session. The decoration stays
    /// queryable (mode `Closed`) until the session is removed after
    /// `Terminated`.
    pub fn close_window(&mut self, launcher: &ProcessLauncher) {
        self.window.close();
        self.terminate(launcher);
    }

    pub fn toggle_maximize(&mut self) {
        self.window.toggle_maximize();
    }

    pub fn resize_window(&mut self, new_size: Size) -> Result<(), WindowError> {
        self.window.resize(new_size)
    }

    pub fn reposition_window(&mut self, new_origin: Point) -> Result<(), WindowError> {
        self.window.reposition(new_origin)
    }

    pub fn set_window_scale(&mut self, ratio: f64) -> Result<(), WindowError> {
        self.window.set_scale(ratio)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            bundle_id: self.bundle_id.clone(),
            container_id: self.container_id.clone(),
            display_name: self.window.display_name().to_string(),
            state: self.state,
            pid: self.pid.map(|p| p.as_u32()),
            last_error: self.last_error.clone(),
            window_mode: self.window.mode(),
            exited_unexpectedly: self.window.exited_unexpectedly(),
            created_at: self.created_at,
        }
    }

    fn fail_launch(&mut self, error: String) {
        warn!(
            event = "core.session.launch_failed",
            session_id = self.session_id,
            error = %error,
        );
        self.pid = None;
        self.transition(SessionState::Terminated);
        self.last_error = Some(error.clone());
        self.window.close();
        self.emit(LifecycleEvent::Terminated {
            session_id: self.session_id.clone(),
            error: Some(error),
        });
    }

    fn finish_termination(&mut self, error: Option<String>) {
        self.pid = None;
        self.transition(SessionState::Terminated);
        if error.is_some() {
            self.last_error = error.clone();
        }
        self.window.close();
        self.emit(LifecycleEvent::Terminated {
            session_id: self.session_id.clone(),
            error,
        });
    }

    fn transition(&mut self, next: SessionState) {
        info!(
            event = "core.session.state_changed",
            session_id = self.session_id,
            from = %self.state,
            to = %next,
        );
        self.state = next;
    }

    fn emit(&self, event: LifecycleEvent) {
        // No subscribers is fine; the stream is observational.
        let _ = self.events.send(event);
    }
}
