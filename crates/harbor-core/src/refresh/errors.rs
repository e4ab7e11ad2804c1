use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Another refresh task is in progress")]
    AlreadyInProgress,

    #[error("Refresh helper quit unexpectedly")]
    HelperExited,

    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Channel operation failed: {source}")]
    ChannelError {
        #[from]
        source: crate::channel::errors::ChannelError,
    },

    #[error("Launch failed: {source}")]
    LauncherError {
        #[from]
        source: crate::launcher::errors::LauncherError,
    },

    #[error("Library operation failed: {source}")]
    LibraryError {
        #[from]
        source: crate::library::errors::LibraryError,
    },
}

impl HarborError for RefreshError {
    fn error_code(&self) -> &'static str {
        match self {
            RefreshError::AlreadyInProgress => "REFRESH_ALREADY_IN_PROGRESS",
            RefreshError::HelperExited => "REFRESH_HELPER_EXITED",
            RefreshError::RefreshFailed { .. } => "REFRESH_FAILED",
            RefreshError::ChannelError { .. } => "CHANNEL_ERROR",
            RefreshError::LauncherError { .. } => "LAUNCHER_ERROR",
            RefreshError::LibraryError { .. } => "LIBRARY_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, RefreshError::AlreadyInProgress)
    }
}
