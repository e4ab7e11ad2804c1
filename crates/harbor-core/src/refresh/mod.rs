//! App refresh over the remote-control channel.
//!
//! Refreshing re-stages and re-signs every installed bundle so guests keep
//! launching after their signatures age out. The work runs in a separate
//! helper process (the builtin refresh worker) launched through the same
//! hosted-request path as any guest; the host remote-controls it and
//! consumes its progress over an anonymous channel. At most one refresh is
//! in flight per coordinator.

pub mod coordinator;
pub mod errors;
pub mod worker;

pub use coordinator::{RefreshCoordinator, RefreshProgress};
pub use errors::RefreshError;
pub use worker::run_worker;

/// The one action the refresh worker understands.
pub const REFRESH_ALL_ACTION: &str = "refresh_all";
