use crate::errors::HarborError;
use crate::window::types::WindowMode;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Cannot {operation} while window is {mode}")]
    InvalidInState {
        operation: &'static str,
        mode: WindowMode,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl HarborError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::InvalidInState { .. } => "WINDOW_INVALID_IN_STATE",
            WindowError::InvalidArgument { .. } => "WINDOW_INVALID_ARGUMENT",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}
