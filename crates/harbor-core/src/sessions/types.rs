use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::window::WindowMode;

/// Lifecycle state of one guest session.
///
/// `Terminated` is terminal for the current launch; a terminated session
/// may be started again, which begins a fresh launch with a fresh request
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Launching,
    Running,
    Backgrounded,
    Terminating,
    Terminated,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// Whether the session may still own a guest process.
    pub fn is_live(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Terminated)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Launching => "launching",
            SessionState::Running => "running",
            SessionState::Backgrounded => "backgrounded",
            SessionState::Terminating => "terminating",
            SessionState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of a session, safe to hold across UI rendering.
///
/// Snapshots are plain data: taking or iterating them never blocks on
/// process IO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub bundle_id: String,
    pub container_id: String,
    pub display_name: String,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub window_mode: WindowMode,
    pub exited_unexpectedly: bool,
    pub created_at: DateTime<Utc>,
}
