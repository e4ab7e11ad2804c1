//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::config::types::{Config, LauncherConfig, MultitaskConfig};
use std::path::PathBuf;

/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_true() -> bool {
    true
}

/// Default presentable display width in points.
pub fn default_display_width() -> f64 {
    1280.0
}

/// Default presentable display height in points.
pub fn default_display_height() -> f64 {
    800.0
}

/// How long to wait for a guest process id before reporting a launch
/// timeout. Guests normally report a pid within a second or two; ten
/// seconds accommodates cold starts on slow disks.
pub fn default_launch_timeout_secs() -> u64 {
    10
}

/// Interval between process-id polls during launch.
pub fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for MultitaskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            launch_maximized: false,
            bottom_window_bar: false,
            background_on_minimize: false,
            display_width: default_display_width(),
            display_height: default_display_height(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            launch_timeout_secs: default_launch_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let harbor_dir = std::env::var("HARBOR_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".harbor")
            });

        let log_level = std::env::var("HARBOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            harbor_dir,
            log_level,
        }
    }
}
