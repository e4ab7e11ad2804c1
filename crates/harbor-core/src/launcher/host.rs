use crate::launcher::errors::LauncherError;
use crate::launcher::types::{LaunchRequest, RequestToken};
use crate::process::Pid;

/// Capability boundary to the privileged subsystem that hosts guest
/// processes.
///
/// Implementations take the interruption sender at construction time and
/// must send the request token on it exactly once when the hosted process
/// exits for any reason (crash, kill, normal exit). The notification
/// carries no reason code; callers verify liveness independently when the
/// reason matters.
pub trait ExtensionHost: Send + Sync {
    /// Begin a hosted request for the guest named in `request`.
    ///
    /// Fails with `LaunchDenied` when the subsystem rejects the identifier.
    /// A successful return does not imply the guest process exists yet.
    fn begin_request(&self, token: RequestToken, request: &LaunchRequest)
    -> Result<(), LauncherError>;

    /// The OS process id backing `token`, or `None` while the guest has not
    /// started (or after it exited). Absence is not an error.
    fn pid_for_request(&self, token: RequestToken) -> Option<Pid>;

    /// Forcibly terminate the request. Idempotent: unknown and
    /// already-terminated tokens are no-ops. Cancelling before a process id
    /// was resolved must still cancel cleanly; no pid may surface as
    /// running afterwards.
    fn cancel_request(&self, token: RequestToken);
}
