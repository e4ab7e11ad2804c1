//! Guest process inspection and termination.
//!
//! The hosted-request subsystem reports a guest's exit with nothing but the
//! request token, so anything that needs a reason (or needs to kill a guest
//! directly) goes through here: liveness checks and identity-verified kills
//! keyed on pid plus process start time.

pub mod errors;
pub mod operations;
pub mod types;

pub use errors::ProcessError;
pub use operations::{get_process_info, is_process_running, kill_process};
pub use types::{Pid, ProcessInfo, ProcessStatus};
