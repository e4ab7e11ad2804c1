use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reserved bundle id for the refresh helper shipped inside the host
/// executable itself.
pub const BUILTIN_REFRESH_WORKER: &str = "builtin.refresh-worker";

/// Manifest describing an installed guest app bundle (`bundle.toml`).
///
/// # Example
///
/// ```toml
/// display_name = "Notes"
/// executable = "bin/notes"
/// args = ["--windowed"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Name shown in window bars and listings.
    pub display_name: String,

    /// Executable path, relative to the bundle directory (absolute paths
    /// are accepted for system-provided guests).
    pub executable: PathBuf,

    /// Arguments passed to the guest on every launch.
    #[serde(default)]
    pub args: Vec<String>,
}

/// An installed bundle as enumerated from the library directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledBundle {
    pub bundle_id: String,
    pub display_name: String,
    pub path: PathBuf,
}

/// A bundle id resolved to something the host can actually execute.
#[derive(Debug, Clone)]
pub struct ResolvedBundle {
    pub bundle_id: String,
    pub display_name: String,
    /// Absolute path of the guest executable.
    pub executable: PathBuf,
    pub args: Vec<String>,
    /// Bundle directory; absent for builtin helpers.
    pub bundle_path: Option<PathBuf>,
}
