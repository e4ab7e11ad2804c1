use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::channel::{ChannelEvent, CompletionResult, RemoteController};
use crate::launcher::{
    InterruptionReceiver, LaunchPayload, LaunchRequest, ProcessLauncher, RequestToken,
};
use crate::library::BUILTIN_REFRESH_WORKER;
use crate::refresh::REFRESH_ALL_ACTION;
use crate::refresh::errors::RefreshError;

/// Container the refresh helper runs in.
const REFRESH_HELPER_CONTAINER: &str = "refresh-helper";

const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(10);

/// Host-side orchestration of one refresh operation.
///
/// Opens a fresh anonymous channel, launches the builtin refresh worker as
/// a hosted guest with the channel bookmark in its payload, remote-controls
/// it, and consumes its progress stream until completion. At most one
/// refresh may be in flight per coordinator; a second concurrent call fails
/// with `AlreadyInProgress`.
pub struct RefreshCoordinator {
    in_flight: AtomicBool,
    peer_timeout: Duration,
}

/// Progress callback payload: fraction of bundles refreshed so far.
pub type RefreshProgress = f64;

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::with_peer_timeout(DEFAULT_PEER_TIMEOUT)
    }

    pub fn with_peer_timeout(peer_timeout: Duration) -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            peer_timeout,
        }
    }

    /// Refresh all installed apps via the helper process.
    ///
    /// Takes the interruption receiver exclusively for the duration of the
    /// operation: a helper exit before the channel connects is surfaced as
    /// `HelperExited` rather than a hung wait. Once the channel is up the
    /// channel itself guarantees termination; helper death synthesizes a
    /// disconnection completion.
    pub async fn refresh_all(
        &self,
        launcher: &ProcessLauncher,
        interruptions: &mut InterruptionReceiver,
        selected_app: Option<String>,
        mut on_progress: impl FnMut(RefreshProgress),
    ) -> Result<(), RefreshError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(RefreshError::AlreadyInProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        info!(event = "core.refresh.started");

        let mut controller = RemoteController::open().map_err(RefreshError::from)?;
        let payload = LaunchPayload {
            selected_app,
            bookmark: Some(controller.bookmark()),
            env: Default::default(),
        };
        let request =
            LaunchRequest::new(BUILTIN_REFRESH_WORKER, REFRESH_HELPER_CONTAINER).with_payload(payload);
        let token = launcher.launch(&request)?;

        let result = self
            .drive_helper(launcher, token, &mut controller, interruptions, &mut on_progress)
            .await;

        // Idempotent cleanup; the helper normally exits on its own.
        launcher.interrupt(token);

        match &result {
            Ok(()) => info!(event = "core.refresh.completed"),
            Err(e) => warn!(event = "core.refresh.failed", error = %e),
        }
        result
    }

    async fn drive_helper(
        &self,
        launcher: &ProcessLauncher,
        token: RequestToken,
        controller: &mut RemoteController,
        interruptions: &mut InterruptionReceiver,
        on_progress: &mut impl FnMut(RefreshProgress),
    ) -> Result<(), RefreshError> {
        launcher
            .wait_for_process_id(token, BUILTIN_REFRESH_WORKER)
            .await?;

        // The helper may die before it ever connects; race the accept
        // against its interruption so callers never hang on a dead helper.
        tokio::select! {
            connected = controller.wait_for_peer(self.peer_timeout) => connected?,
            _ = wait_for_interruption(interruptions, token) => {
                return Err(RefreshError::HelperExited);
            }
        }

        controller.invoke(REFRESH_ALL_ACTION).await?;

        // From here the channel guarantees termination: the reader
        // synthesizes a disconnection completion if the helper dies.
        loop {
            match controller.next_event().await? {
                ChannelEvent::Progress { value } => {
                    debug!(event = "core.refresh.progress", value = value);
                    on_progress(value);
                }
                ChannelEvent::Completed { result } => {
                    return match result {
                        CompletionResult::Success => Ok(()),
                        CompletionResult::Failure { message } => {
                            Err(RefreshError::RefreshFailed { message })
                        }
                        CompletionResult::PeerDisconnected => Err(RefreshError::HelperExited),
                    };
                }
            }
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Resolves when an interruption for `token` arrives. Interruptions for
/// other tokens are not expected while a refresh holds the receiver.
async fn wait_for_interruption(interruptions: &mut InterruptionReceiver, token: RequestToken) {
    loop {
        match interruptions.recv().await {
            Some(t) if t == token => return,
            Some(other) => {
                warn!(
                    event = "core.refresh.unrelated_interruption",
                    token = %other,
                );
            }
            // Sender gone: no interruption can ever arrive.
            None => std::future::pending::<()>().await,
        }
    }
}
