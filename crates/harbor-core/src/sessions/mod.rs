//! Guest app sessions and the process-wide session registry.
//!
//! A [`Session`] models one running (or previously running) guest app
//! instance tied to a window: lifecycle state machine, request token,
//! process id, and the owned [`WindowDecoration`]. The
//! [`SessionRegistry`] is the single writer of the session table and the
//! place interruption notifications are applied after being re-dispatched
//! onto the owning context.

pub mod errors;
pub mod events;
pub mod registry;
pub mod session;
pub mod types;

pub use errors::SessionError;
pub use events::LifecycleEvent;
pub use registry::SessionRegistry;
pub use session::Session;
pub use types::{SessionSnapshot, SessionState};
