//! # Configuration System
//!
//! Hierarchical TOML configuration system for Harbor.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.harbor/config.toml` (global user preferences)
//! 3. **Project config** - `./.harbor/config.toml` (directory-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.harbor/config.toml
//! [library]
//! selected_app = "com.example.notes"
//! selected_container = "default"
//!
//! [multitask]
//! launch_maximized = true
//! background_on_minimize = false
//!
//! [signing]
//! command = "rcodesign sign"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use harbor_core::config::HarborConfig;
//!
//! // Handle config errors explicitly - don't silently fall back to defaults
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarborConfig::load_hierarchy()?;
//!     let _ = config.multitask.launch_maximized;
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

// Public API exports
pub use types::{Config, HarborConfig, LauncherConfig, LibraryConfig, MultitaskConfig, SigningConfig};
pub use validation::validate_config;

impl HarborConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }
}
