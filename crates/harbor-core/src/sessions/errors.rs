use crate::errors::HarborError;
use crate::sessions::types::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session '{session_id}' is already running")]
    AlreadyRunning { session_id: String },

    #[error("Session '{session_id}' not found")]
    NotFound { session_id: String },

    #[error("Session '{session_id}' is still {state}; terminate it before removal")]
    SessionStillLive {
        session_id: String,
        state: SessionState,
    },

    #[error("Launch failed: {source}")]
    LauncherError {
        #[from]
        source: crate::launcher::errors::LauncherError,
    },

    #[error("Window operation failed: {source}")]
    WindowError {
        #[from]
        source: crate::window::errors::WindowError,
    },
}

impl HarborError for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            SessionError::AlreadyRunning { .. } => "SESSION_ALREADY_RUNNING",
            SessionError::NotFound { .. } => "SESSION_NOT_FOUND",
            SessionError::SessionStillLive { .. } => "SESSION_STILL_LIVE",
            SessionError::LauncherError { .. } => "LAUNCHER_ERROR",
            SessionError::WindowError { .. } => "WINDOW_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            SessionError::AlreadyRunning { .. }
                | SessionError::NotFound { .. }
                | SessionError::SessionStillLive { .. }
        )
    }
}
