use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::library::errors::LibraryError;
use crate::library::types::{
    BUILTIN_REFRESH_WORKER, BundleManifest, InstalledBundle, ResolvedBundle,
};

const MANIFEST_FILE: &str = "bundle.toml";

/// The subcommand the host executable runs as when acting as the builtin
/// refresh helper.
const REFRESH_WORKER_ARG: &str = "refresh-worker";

/// Catalog of installed guest app bundles and their data containers.
#[derive(Debug, Clone)]
pub struct BundleLibrary {
    apps_dir: PathBuf,
    containers_dir: PathBuf,
}

impl BundleLibrary {
    pub fn new(apps_dir: PathBuf, containers_dir: PathBuf) -> Self {
        Self {
            apps_dir,
            containers_dir,
        }
    }

    /// Construct from the runtime config's data directories.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.apps_dir(), config.containers_dir())
    }

    /// Directory an installed bundle lives in (whether or not it exists).
    pub fn bundle_path(&self, bundle_id: &str) -> Result<PathBuf, LibraryError> {
        validate_id(bundle_id).map_err(|reason| LibraryError::InvalidBundleId {
            bundle_id: bundle_id.to_string(),
            reason,
        })?;
        Ok(self.apps_dir.join(bundle_id))
    }

    /// Resolve a bundle id to an executable the host can launch.
    ///
    /// The reserved id [`BUILTIN_REFRESH_WORKER`] resolves to the host's own
    /// executable with the worker subcommand instead of a library entry.
    pub fn resolve(&self, bundle_id: &str) -> Result<ResolvedBundle, LibraryError> {
        if bundle_id == BUILTIN_REFRESH_WORKER {
            let executable = std::env::current_exe().map_err(LibraryError::from)?;
            return Ok(ResolvedBundle {
                bundle_id: bundle_id.to_string(),
                display_name: "Refresh Helper".to_string(),
                executable,
                args: vec![REFRESH_WORKER_ARG.to_string()],
                bundle_path: None,
            });
        }

        let bundle_path = self.bundle_path(bundle_id)?;
        if !bundle_path.is_dir() {
            return Err(LibraryError::BundleNotFound {
                bundle_id: bundle_id.to_string(),
            });
        }

        let manifest = read_manifest(bundle_id, &bundle_path)?;
        let executable = if manifest.executable.is_absolute() {
            manifest.executable.clone()
        } else {
            bundle_path.join(&manifest.executable)
        };

        debug!(
            event = "core.library.bundle_resolved",
            bundle_id = bundle_id,
            executable = %executable.display(),
        );

        Ok(ResolvedBundle {
            bundle_id: bundle_id.to_string(),
            display_name: manifest.display_name,
            executable,
            args: manifest.args,
            bundle_path: Some(bundle_path),
        })
    }

    /// Enumerate installed bundles. Entries without a readable manifest are
    /// skipped with a warning rather than failing the whole listing.
    pub fn list_bundles(&self) -> Result<Vec<InstalledBundle>, LibraryError> {
        let mut bundles = Vec::new();

        let entries = match fs::read_dir(&self.apps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(bundles),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let bundle_id = entry.file_name().to_string_lossy().to_string();
            match read_manifest(&bundle_id, &entry.path()) {
                Ok(manifest) => bundles.push(InstalledBundle {
                    bundle_id,
                    display_name: manifest.display_name,
                    path: entry.path(),
                }),
                Err(e) => {
                    warn!(
                        event = "core.library.manifest_unreadable",
                        bundle_id = bundle_id,
                        error = %e,
                    );
                }
            }
        }

        bundles.sort_by(|a, b| a.bundle_id.cmp(&b.bundle_id));
        Ok(bundles)
    }

    /// Install (or replace) a bundle from `source` under `bundle_id`.
    ///
    /// The copy goes through a staging transaction, so a failed copy never
    /// leaves a half-installed bundle in the library. The source must carry
    /// a readable manifest.
    pub fn install(&self, bundle_id: &str, source: &Path) -> Result<InstalledBundle, LibraryError> {
        let manifest = read_manifest(bundle_id, source)?;
        let target = self.bundle_path(bundle_id)?;
        fs::create_dir_all(&self.apps_dir)?;

        let mut txn = crate::staging::BundleTransaction::new(&target);
        let working = txn.begin()?.to_path_buf();
        crate::staging::copy_dir_all(source, &working)?;
        txn.commit()?;

        info!(
            event = "core.library.bundle_installed",
            bundle_id = bundle_id,
            source = %source.display(),
        );

        Ok(InstalledBundle {
            bundle_id: bundle_id.to_string(),
            display_name: manifest.display_name,
            path: target,
        })
    }

    /// Resolve a container id to its data directory, creating it on first use.
    pub fn container_path(&self, container_id: &str) -> Result<PathBuf, LibraryError> {
        validate_id(container_id).map_err(|_| LibraryError::InvalidContainerId {
            container_id: container_id.to_string(),
        })?;
        let path = self.containers_dir.join(container_id);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Bundle and container ids become directory names, so anything that could
/// escape the library root is rejected.
fn validate_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("cannot be empty".to_string());
    }
    if id.starts_with('.') {
        return Err("cannot start with '.'".to_string());
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
    {
        return Err(format!("contains invalid character '{}'", bad));
    }
    Ok(())
}

fn read_manifest(bundle_id: &str, bundle_path: &Path) -> Result<BundleManifest, LibraryError> {
    let manifest_path = bundle_path.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).map_err(|e| LibraryError::ManifestError {
        bundle_id: bundle_id.to_string(),
        message: format!("{}: {}", manifest_path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| LibraryError::ManifestError {
        bundle_id: bundle_id.to_string(),
        message: e.to_string(),
    })
}
