use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Bundle '{bundle_id}' is not installed")]
    BundleNotFound { bundle_id: String },

    #[error("Invalid bundle id '{bundle_id}': {reason}")]
    InvalidBundleId { bundle_id: String, reason: String },

    #[error("Invalid container id '{container_id}'")]
    InvalidContainerId { container_id: String },

    #[error("Failed to read manifest for '{bundle_id}': {message}")]
    ManifestError { bundle_id: String, message: String },

    #[error("Staging failed: {source}")]
    StagingError {
        #[from]
        source: crate::staging::errors::TransactionError,
    },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl HarborError for LibraryError {
    fn error_code(&self) -> &'static str {
        match self {
            LibraryError::BundleNotFound { .. } => "BUNDLE_NOT_FOUND",
            LibraryError::InvalidBundleId { .. } => "INVALID_BUNDLE_ID",
            LibraryError::InvalidContainerId { .. } => "INVALID_CONTAINER_ID",
            LibraryError::ManifestError { .. } => "BUNDLE_MANIFEST_ERROR",
            LibraryError::StagingError { .. } => "LIBRARY_STAGING_ERROR",
            LibraryError::IoError { .. } => "LIBRARY_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            LibraryError::BundleNotFound { .. }
                | LibraryError::InvalidBundleId { .. }
                | LibraryError::InvalidContainerId { .. }
        )
    }
}
