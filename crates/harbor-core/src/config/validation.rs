//! Configuration validation.

use crate::config::types::HarborConfig;
use crate::errors::ConfigError;

/// Validate a fully merged configuration.
///
/// Rejects values that would make the window state machine or the launcher
/// misbehave at runtime rather than failing at the point of use.
pub fn validate_config(config: &HarborConfig) -> Result<(), ConfigError> {
    if config.multitask.display_width <= 0.0 || !config.multitask.display_width.is_finite() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "multitask.display_width must be a positive number, got {}",
                config.multitask.display_width
            ),
        });
    }

    if config.multitask.display_height <= 0.0 || !config.multitask.display_height.is_finite() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "multitask.display_height must be a positive number, got {}",
                config.multitask.display_height
            ),
        });
    }

    if config.launcher.launch_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "launcher.launch_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.launcher.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "launcher.poll_interval_ms must be greater than 0".to_string(),
        });
    }

    if let Some(command) = &config.signing.command
        && command.trim().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "signing.command must not be empty when set".to_string(),
        });
    }

    Ok(())
}
