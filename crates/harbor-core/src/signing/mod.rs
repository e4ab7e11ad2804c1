//! Bundle signing boundary.
//!
//! Signing internals (certificates, entitlements, the trust chain) are
//! opaque to Harbor. The core interacts with signing only through
//! [`BundleSigner`]: sign the bundle at a path, succeed or fail.
//! [`CommandSigner`] delegates to a user-configured external command, the
//! same way git operations shell out to the `git` binary elsewhere in this
//! workspace's lineage.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Failed to run signing command '{command}': {message}")]
    SpawnFailed { command: String, message: String },

    #[error("Signing command failed for '{bundle}': {message}")]
    CommandFailed { bundle: String, message: String },
}

impl HarborError for SigningError {
    fn error_code(&self) -> &'static str {
        match self {
            SigningError::SpawnFailed { .. } => "SIGNING_SPAWN_FAILED",
            SigningError::CommandFailed { .. } => "SIGNING_COMMAND_FAILED",
        }
    }
}

/// Capability interface to the signing subsystem.
pub trait BundleSigner: Send + Sync {
    /// Sign the bundle at `bundle_path` in place.
    fn sign_bundle(&self, bundle_path: &Path) -> Result<(), SigningError>;
}

/// Signs bundles by running an external command with the bundle path
/// appended, e.g. `rcodesign sign <bundle>`.
#[derive(Debug, Clone)]
pub struct CommandSigner {
    command: String,
}

impl CommandSigner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Build a signer from config; `None` when no command is configured.
    pub fn from_config(config: &crate::config::SigningConfig) -> Option<Self> {
        config.command.as_deref().map(Self::new)
    }
}

impl BundleSigner for CommandSigner {
    fn sign_bundle(&self, bundle_path: &Path) -> Result<(), SigningError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| SigningError::SpawnFailed {
            command: self.command.clone(),
            message: "empty signing command".to_string(),
        })?;

        debug!(
            event = "core.signing.sign_started",
            bundle = %bundle_path.display(),
            command = %self.command,
        );

        let output = Command::new(program)
            .args(parts)
            .arg(bundle_path)
            .output()
            .map_err(|e| SigningError::SpawnFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SigningError::CommandFailed {
                bundle: bundle_path.display().to_string(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        info!(
            event = "core.signing.sign_completed",
            bundle = %bundle_path.display(),
        );
        Ok(())
    }
}
