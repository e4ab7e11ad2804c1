//! Hosted guest process launching.
//!
//! Guests are started as hosted requests against an [`ExtensionHost`], the
//! capability boundary to the privileged subsystem that actually runs guest
//! code. The host is handed a fresh [`RequestToken`] per launch; everything
//! afterwards (process-id resolution, interruption delivery, kill requests)
//! is correlated by that token. Interruption notifications carry only the
//! token and arrive on background tasks; they are re-dispatched through an
//! mpsc channel and applied on the owning context.
//!
//! [`SubprocessHost`] is the concrete host used in production: guests run
//! as child processes of the host application. Tests substitute
//! [`fake::FakeExtensionHost`].

pub mod errors;
pub mod host;
pub mod subprocess;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

mod operations;

pub use errors::LauncherError;
pub use host::ExtensionHost;
pub use operations::ProcessLauncher;
pub use subprocess::SubprocessHost;
pub use types::{InterruptionReceiver, InterruptionSender, LaunchPayload, LaunchRequest, RequestToken};
