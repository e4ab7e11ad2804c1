use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction already begun for '{path}'")]
    AlreadyBegun { path: std::path::PathBuf },

    #[error("Transaction has not been begun")]
    NotBegun,

    #[error("Commit failed for '{path}': {message}")]
    CommitFailed {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl HarborError for TransactionError {
    fn error_code(&self) -> &'static str {
        match self {
            TransactionError::AlreadyBegun { .. } => "TRANSACTION_ALREADY_BEGUN",
            TransactionError::NotBegun => "TRANSACTION_NOT_BEGUN",
            TransactionError::CommitFailed { .. } => "TRANSACTION_COMMIT_FAILED",
            TransactionError::IoError { .. } => "TRANSACTION_IO_ERROR",
        }
    }
}
