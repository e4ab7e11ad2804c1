//! Configuration type definitions for Harbor.
//!
//! These types are serialized/deserialized from TOML config files. Runtime
//! paths (data directories) live in [`Config`] and are derived from the
//! environment, not from config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [library]
//! selected_app = "com.example.notes"
//! selected_container = "default"
//!
//! [multitask]
//! enabled = true
//! launch_maximized = false
//! background_on_minimize = false
//!
//! [launcher]
//! launch_timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for Harbor.
///
/// This struct holds paths and settings that are derived from environment
/// variables and system defaults, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for all Harbor data (default: ~/.harbor)
    pub harbor_dir: PathBuf,
    /// Log level for the application
    pub log_level: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding installed guest app bundles, one per bundle id.
    pub fn apps_dir(&self) -> PathBuf {
        self.harbor_dir.join("apps")
    }

    /// Directory holding guest data containers, one per container id.
    pub fn containers_dir(&self) -> PathBuf {
        self.harbor_dir.join("containers")
    }
}

/// Main configuration loaded from TOML config files.
///
/// This is the primary configuration structure that gets loaded from:
/// 1. User config: `~/.harbor/config.toml`
/// 2. Project config: `./.harbor/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarborConfig {
    /// Persisted selections shared with guest launches.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Multitask window behavior.
    #[serde(default)]
    pub multitask: MultitaskConfig,

    /// Guest launch timeouts.
    #[serde(default)]
    pub launcher: LauncherConfig,

    /// External bundle signing.
    #[serde(default)]
    pub signing: SigningConfig,
}

/// Persisted app/container selection consumed at session creation time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryConfig {
    /// Bundle id of the last selected guest app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_app: Option<String>,

    /// Container id used when none is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_container: Option<String>,
}

/// Multitask window behavior flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultitaskConfig {
    /// Whether guests may run concurrently in floating windows.
    #[serde(default = "super::defaults::default_true")]
    pub enabled: bool,

    /// Open new guest windows maximized.
    #[serde(default)]
    pub launch_maximized: bool,

    /// Draw the window bar below the content instead of above it.
    #[serde(default)]
    pub bottom_window_bar: bool,

    /// Request session backgrounding on minimize even when the session has
    /// background notifications disabled.
    #[serde(default)]
    pub background_on_minimize: bool,

    /// Presentable width of the host display, in points.
    #[serde(default = "super::defaults::default_display_width")]
    pub display_width: f64,

    /// Presentable height of the host display, in points.
    #[serde(default = "super::defaults::default_display_height")]
    pub display_height: f64,
}

/// Guest launch timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// How long to wait for a launched guest's process id before giving up.
    #[serde(default = "super::defaults::default_launch_timeout_secs")]
    pub launch_timeout_secs: u64,

    /// Interval between process-id polls during launch.
    #[serde(default = "super::defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// External signing command configuration.
///
/// Signing internals are opaque to Harbor; when `command` is set it is run
/// with the bundle path appended during refresh operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigningConfig {
    /// Signing command, e.g. `"rcodesign sign"`. When absent, refresh
    /// re-stages bundles without signing them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let config = Config {
            harbor_dir: PathBuf::from("/data/harbor"),
            log_level: "info".to_string(),
        };
        assert_eq!(config.apps_dir(), PathBuf::from("/data/harbor/apps"));
        assert_eq!(
            config.containers_dir(),
            PathBuf::from("/data/harbor/containers")
        );
    }

    #[test]
    fn test_harbor_config_defaults_from_empty_toml() {
        let config: HarborConfig = toml::from_str("").unwrap();
        assert!(config.multitask.enabled);
        assert!(!config.multitask.launch_maximized);
        assert!(!config.multitask.background_on_minimize);
        assert!(config.library.selected_app.is_none());
        assert_eq!(config.launcher.launch_timeout_secs, 10);
        assert!(config.signing.command.is_none());
    }

    #[test]
    fn test_harbor_config_parse() {
        let toml_str = r#"
            [library]
            selected_app = "com.example.notes"
            selected_container = "work"

            [multitask]
            launch_maximized = true
            display_width = 1920.0
            display_height = 1080.0

            [signing]
            command = "rcodesign sign"
        "#;
        let config: HarborConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.library.selected_app.as_deref(), Some("com.example.notes"));
        assert_eq!(config.library.selected_container.as_deref(), Some("work"));
        assert!(config.multitask.launch_maximized);
        assert_eq!(config.multitask.display_width, 1920.0);
        assert_eq!(config.signing.command.as_deref(), Some("rcodesign sign"));
    }
}
