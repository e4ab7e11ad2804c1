use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::LauncherConfig;
use crate::launcher::errors::LauncherError;
use crate::launcher::host::ExtensionHost;
use crate::launcher::types::{LaunchRequest, RequestToken};
use crate::process::Pid;

/// Request/interruption protocol facade over an [`ExtensionHost`].
///
/// Generates the request token per launch, polls the host for the backing
/// process id with a bounded wait, and forwards interruption requests.
/// All methods are safe to call with tokens the host no longer knows.
pub struct ProcessLauncher {
    host: Arc<dyn ExtensionHost>,
    launch_timeout: Duration,
    poll_interval: Duration,
}

impl ProcessLauncher {
    pub fn new(host: Arc<dyn ExtensionHost>, config: &LauncherConfig) -> Self {
        Self::with_timeouts(
            host,
            Duration::from_secs(config.launch_timeout_secs),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    pub fn with_timeouts(
        host: Arc<dyn ExtensionHost>,
        launch_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            host,
            launch_timeout,
            poll_interval,
        }
    }

    /// Begin a hosted request for the guest. Returns the token correlating
    /// all later callbacks; the process id is resolved separately.
    pub fn launch(&self, request: &LaunchRequest) -> Result<RequestToken, LauncherError> {
        let token = RequestToken::generate();
        info!(
            event = "core.launcher.launch_started",
            token = %token,
            bundle_id = request.bundle_id,
            container_id = request.container_id,
        );

        if let Err(e) = self.host.begin_request(token, request) {
            warn!(
                event = "core.launcher.launch_rejected",
                token = %token,
                bundle_id = request.bundle_id,
                error = %e,
            );
            return Err(e);
        }
        Ok(token)
    }

    /// Non-blocking poll for the process id backing `token`. `None` before
    /// the guest process starts (not an error).
    pub fn resolve_process_id(&self, token: RequestToken) -> Option<Pid> {
        self.host.pid_for_request(token)
    }

    /// Bounded wait for the process id backing `token`.
    pub async fn wait_for_process_id(
        &self,
        token: RequestToken,
        bundle_id: &str,
    ) -> Result<Pid, LauncherError> {
        let deadline = tokio::time::Instant::now() + self.launch_timeout;
        loop {
            if let Some(pid) = self.host.pid_for_request(token) {
                debug!(
                    event = "core.launcher.pid_resolved",
                    token = %token,
                    pid = %pid,
                );
                return Ok(pid);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(LauncherError::LaunchTimeout {
                    bundle_id: bundle_id.to_string(),
                    waited_ms: self.launch_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Request forcible termination. Idempotent; safe before the process id
    /// has resolved (the launch is cancelled cleanly).
    pub fn interrupt(&self, token: RequestToken) {
        debug!(event = "core.launcher.interrupt_requested", token = %token);
        self.host.cancel_request(token);
    }
}
