use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum LauncherError {
    #[error("Launch of '{bundle_id}' denied: {reason}")]
    LaunchDenied { bundle_id: String, reason: String },

    #[error("No process id observed for '{bundle_id}' within {waited_ms}ms")]
    LaunchTimeout { bundle_id: String, waited_ms: u64 },

    #[error("Failed to spawn guest process for '{bundle_id}': {message}")]
    SpawnFailed { bundle_id: String, message: String },
}

impl HarborError for LauncherError {
    fn error_code(&self) -> &'static str {
        match self {
            LauncherError::LaunchDenied { .. } => "LAUNCH_DENIED",
            LauncherError::LaunchTimeout { .. } => "LAUNCH_TIMEOUT",
            LauncherError::SpawnFailed { .. } => "LAUNCH_SPAWN_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, LauncherError::LaunchDenied { .. })
    }
}
