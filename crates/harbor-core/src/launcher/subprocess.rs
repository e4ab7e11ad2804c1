use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::launcher::errors::LauncherError;
use crate::launcher::host::ExtensionHost;
use crate::launcher::types::{InterruptionSender, LaunchRequest, RequestToken};
use crate::library::BundleLibrary;
use crate::process::{self, Pid};

/// Environment variables guests are started with.
const ENV_BUNDLE_ID: &str = "HARBOR_BUNDLE_ID";
const ENV_CONTAINER_PATH: &str = "HARBOR_CONTAINER_PATH";
const ENV_SELECTED_APP: &str = "HARBOR_SELECTED_APP";
const ENV_CHANNEL_BOOKMARK: &str = "HARBOR_CHANNEL_BOOKMARK";

#[derive(Debug)]
struct HostedRequest {
    pid: Pid,
    start_time: Option<u64>,
}

/// [`ExtensionHost`] that runs guests as child processes of the host
/// application.
///
/// Each request spawns the bundle's executable with its container directory
/// as working directory and the launch payload mapped into `HARBOR_*`
/// environment variables. A background task per request waits for the child
/// to exit and sends the request token on the interruption channel.
pub struct SubprocessHost {
    library: BundleLibrary,
    interruptions: InterruptionSender,
    requests: Arc<Mutex<HashMap<RequestToken, HostedRequest>>>,
}

impl SubprocessHost {
    pub fn new(library: BundleLibrary, interruptions: InterruptionSender) -> Self {
        Self {
            library,
            interruptions,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl ExtensionHost for SubprocessHost {
    fn begin_request(
        &self,
        token: RequestToken,
        request: &LaunchRequest,
    ) -> Result<(), LauncherError> {
        let bundle =
            self.library
                .resolve(&request.bundle_id)
                .map_err(|e| LauncherError::LaunchDenied {
                    bundle_id: request.bundle_id.clone(),
                    reason: e.to_string(),
                })?;
        let container =
            self.library
                .container_path(&request.container_id)
                .map_err(|e| LauncherError::LaunchDenied {
                    bundle_id: request.bundle_id.clone(),
                    reason: e.to_string(),
                })?;

        let mut command = Command::new(&bundle.executable);
        command
            .args(&bundle.args)
            .current_dir(&container)
            .env(ENV_BUNDLE_ID, &request.bundle_id)
            .env(ENV_CONTAINER_PATH, &container);
        if let Some(selected_app) = &request.payload.selected_app {
            command.env(ENV_SELECTED_APP, selected_app);
        }
        if let Some(bookmark) = &request.payload.bookmark {
            command.env(ENV_CHANNEL_BOOKMARK, bookmark.to_string());
        }
        for (key, value) in &request.payload.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|e| LauncherError::SpawnFailed {
            bundle_id: request.bundle_id.clone(),
            message: e.to_string(),
        })?;

        let Some(raw_pid) = child.id() else {
            return Err(LauncherError::SpawnFailed {
                bundle_id: request.bundle_id.clone(),
                message: "child exited before a pid was observed".to_string(),
            });
        };
        let pid = Pid::from_raw(raw_pid);
        let start_time = process::get_process_info(pid).ok().map(|i| i.start_time);

        info!(
            event = "core.launcher.request_started",
            token = %token,
            bundle_id = request.bundle_id,
            pid = raw_pid,
        );

        self.requests
            .lock()
            .expect("request table poisoned")
            .insert(token, HostedRequest { pid, start_time });

        // Exit watcher: the only source of interruption notifications.
        let requests = Arc::clone(&self.requests);
        let interruptions = self.interruptions.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            debug!(
                event = "core.launcher.request_exited",
                token = %token,
                status = ?status.as_ref().map(|s| s.code()).ok(),
            );
            requests.lock().expect("request table poisoned").remove(&token);
            let _ = interruptions.send(token);
        });

        Ok(())
    }

    fn pid_for_request(&self, token: RequestToken) -> Option<Pid> {
        self.requests
            .lock()
            .expect("request table poisoned")
            .get(&token)
            .map(|r| r.pid)
    }

    fn cancel_request(&self, token: RequestToken) {
        let entry = {
            let requests = self.requests.lock().expect("request table poisoned");
            requests.get(&token).map(|r| (r.pid, r.start_time))
        };
        let Some((pid, start_time)) = entry else {
            debug!(event = "core.launcher.cancel_noop", token = %token);
            return;
        };

        match process::kill_process(pid, start_time) {
            Ok(()) => {
                info!(event = "core.launcher.request_cancelled", token = %token, pid = %pid);
            }
            Err(process::ProcessError::NotFound { .. }) => {
                debug!(event = "core.launcher.cancel_already_dead", token = %token, pid = %pid);
            }
            Err(e) => {
                warn!(event = "core.launcher.cancel_failed", token = %token, pid = %pid, error = %e);
            }
        }
        // The exit watcher observes the death and delivers the interruption.
    }
}
