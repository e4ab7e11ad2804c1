use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::staging::errors::TransactionError;

/// A staged mutation of one bundle directory.
///
/// `begin` snapshots the bundle into a working directory in the same parent
/// (same filesystem, so the commit renames are atomic). Mutations happen on
/// [`BundleTransaction::working_path`]; `commit` swaps the snapshot in,
/// `cancel` discards it. Dropping an uncommitted transaction cancels it.
#[derive(Debug)]
pub struct BundleTransaction {
    original: PathBuf,
    working: Option<PathBuf>,
}

impl BundleTransaction {
    pub fn new(bundle_path: impl Into<PathBuf>) -> Self {
        Self {
            original: bundle_path.into(),
            working: None,
        }
    }

    pub fn original_path(&self) -> &Path {
        &self.original
    }

    /// The mutable snapshot, present between `begin` and `commit`/`cancel`.
    pub fn working_path(&self) -> Option<&Path> {
        self.working.as_deref()
    }

    /// Snapshot the bundle into a working directory.
    ///
    /// When the original does not exist yet (fresh install) the working
    /// directory starts empty and `commit` creates the bundle.
    pub fn begin(&mut self) -> Result<&Path, TransactionError> {
        if self.working.is_some() {
            return Err(TransactionError::AlreadyBegun {
                path: self.original.clone(),
            });
        }

        let working = sibling_path(&self.original, "staging");
        if self.original.exists() {
            copy_dir_all(&self.original, &working)?;
        } else {
            fs::create_dir_all(&working)?;
        }

        debug!(
            event = "core.staging.transaction_begun",
            bundle = %self.original.display(),
            working = %working.display(),
        );

        self.working = Some(working);
        Ok(self.working.as_deref().expect("just set"))
    }

    /// Atomically replace the original bundle with the working snapshot.
    ///
    /// The original is moved aside before the snapshot is renamed in; if the
    /// second rename fails the original is restored.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        let working = self.working.take().ok_or(TransactionError::NotBegun)?;

        let backup = if self.original.exists() {
            let backup = sibling_path(&self.original, "old");
            fs::rename(&self.original, &backup)?;
            Some(backup)
        } else {
            None
        };

        if let Err(e) = fs::rename(&working, &self.original) {
            if let Some(backup) = &backup {
                if let Err(restore_err) = fs::rename(backup, &self.original) {
                    warn!(
                        event = "core.staging.restore_failed",
                        bundle = %self.original.display(),
                        error = %restore_err,
                    );
                }
            }
            let _ = fs::remove_dir_all(&working);
            return Err(TransactionError::CommitFailed {
                path: self.original.clone(),
                message: e.to_string(),
            });
        }

        if let Some(backup) = backup {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!(
                    event = "core.staging.backup_cleanup_failed",
                    path = %backup.display(),
                    error = %e,
                );
            }
        }

        info!(
            event = "core.staging.transaction_committed",
            bundle = %self.original.display(),
        );
        Ok(())
    }

    /// Discard the working snapshot. Safe to call at any point.
    pub fn cancel(&mut self) {
        if let Some(working) = self.working.take() {
            if let Err(e) = fs::remove_dir_all(&working) {
                warn!(
                    event = "core.staging.cancel_cleanup_failed",
                    path = %working.display(),
                    error = %e,
                );
            }
            debug!(
                event = "core.staging.transaction_cancelled",
                bundle = %self.original.display(),
            );
        }
    }
}

impl Drop for BundleTransaction {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A unique sibling path in the bundle's parent directory, kept on the same
/// filesystem so renames against the original are atomic.
fn sibling_path(original: &Path, tag: &str) -> PathBuf {
    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "bundle".to_string());
    let unique = Uuid::new_v4().simple().to_string();
    original.with_file_name(format!(".{}.{}-{}", name, tag, unique))
}

pub(crate) fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
