//! Scriptable in-memory [`ExtensionHost`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::launcher::errors::LauncherError;
use crate::launcher::host::ExtensionHost;
use crate::launcher::types::{InterruptionSender, LaunchRequest, RequestToken};
use crate::process::Pid;

#[derive(Debug, Default)]
struct FakeRequest {
    pid: Option<Pid>,
    cancelled: bool,
    exited: bool,
}

#[derive(Default)]
struct FakeState {
    denied: HashSet<String>,
    auto_pid: Option<u32>,
    requests: HashMap<RequestToken, FakeRequest>,
    last_token: Option<RequestToken>,
}

/// In-memory host whose pid resolution and interruptions are driven
/// explicitly by the test body.
pub(crate) struct FakeExtensionHost {
    interruptions: InterruptionSender,
    state: Mutex<FakeState>,
}

impl FakeExtensionHost {
    pub fn new(interruptions: InterruptionSender) -> Arc<Self> {
        Arc::new(Self {
            interruptions,
            state: Mutex::new(FakeState::default()),
        })
    }

    /// Reject all future requests for `bundle_id`.
    pub fn deny(&self, bundle_id: &str) {
        self.state
            .lock()
            .unwrap()
            .denied
            .insert(bundle_id.to_string());
    }

    /// Assign this pid to every new request at begin time.
    pub fn set_auto_pid(&self, pid: u32) {
        self.state.lock().unwrap().auto_pid = Some(pid);
    }

    /// Token of the most recently begun request.
    pub fn last_token(&self) -> Option<RequestToken> {
        self.state.lock().unwrap().last_token
    }

    /// Simulate the guest process starting after the request began.
    /// Ignored for cancelled requests; nothing may leak as running.
    pub fn resolve_pid(&self, token: RequestToken, pid: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(request) = state.requests.get_mut(&token)
            && !request.cancelled
            && !request.exited
        {
            request.pid = Some(Pid::from_raw(pid));
        }
    }

    /// Simulate the hosted process exiting (crash or normal exit).
    pub fn send_interruption(&self, token: RequestToken) {
        let mut state = self.state.lock().unwrap();
        let Some(request) = state.requests.get_mut(&token) else {
            return;
        };
        if request.exited {
            return;
        }
        request.exited = true;
        request.pid = None;
        let _ = self.interruptions.send(token);
    }
}

impl ExtensionHost for FakeExtensionHost {
    fn begin_request(
        &self,
        token: RequestToken,
        request: &LaunchRequest,
    ) -> Result<(), LauncherError> {
        let mut state = self.state.lock().unwrap();
        if state.denied.contains(&request.bundle_id) {
            return Err(LauncherError::LaunchDenied {
                bundle_id: request.bundle_id.clone(),
                reason: "identifier rejected by hosting subsystem".to_string(),
            });
        }
        let pid = state.auto_pid.map(Pid::from_raw);
        state.requests.insert(
            token,
            FakeRequest {
                pid,
                cancelled: false,
                exited: false,
            },
        );
        state.last_token = Some(token);
        Ok(())
    }

    fn pid_for_request(&self, token: RequestToken) -> Option<Pid> {
        let state = self.state.lock().unwrap();
        state
            .requests
            .get(&token)
            .filter(|r| !r.cancelled && !r.exited)
            .and_then(|r| r.pid)
    }

    fn cancel_request(&self, token: RequestToken) {
        let send = {
            let mut state = self.state.lock().unwrap();
            match state.requests.get_mut(&token) {
                Some(request) if !request.exited => {
                    request.cancelled = true;
                    request.exited = true;
                    request.pid = None;
                    true
                }
                _ => false,
            }
        };
        // The subsystem confirms the exit of a cancelled request the same
        // way it reports any other exit.
        if send {
            let _ = self.interruptions.send(token);
        }
    }
}
