//! harbor-core: Core library for guest app hosting and multitask windows
//!
//! This library provides the orchestration logic for running guest apps as
//! hosted sub-processes and presenting them concurrently in floating
//! windows. It is used by the CLI and is UI-toolkit agnostic.
//!
//! # Main Entry Points
//!
//! - [`sessions`] - Session lifecycle state machine and registry
//! - [`launcher`] - Hosted-process launching and interruption protocol
//! - [`window`] - Per-window presentation state
//! - [`channel`] - Anonymous remote-control channel
//! - [`refresh`] - App refresh coordinator and worker
//! - [`config`] - Configuration management
//!
//! # Threading
//!
//! Session, registry, and window state is owned by one context. Callbacks
//! from other processes (process-id resolution, interruptions, channel
//! messages) arrive on background tasks and are re-dispatched through
//! channels onto the owning context before any state mutation.

pub mod channel;
pub mod config;
pub mod errors;
pub mod events;
pub mod launcher;
pub mod library;
pub mod logging;
pub mod process;
pub mod refresh;
pub mod sessions;
pub mod signing;
pub mod staging;
pub mod window;

// Re-export commonly used types at crate root for convenience
pub use channel::{ChannelBookmark, ChannelEvent, CompletionResult, ProgressReporter, RemoteController};
pub use config::{Config, HarborConfig};
pub use launcher::{ExtensionHost, LaunchRequest, ProcessLauncher, RequestToken, SubprocessHost};
pub use library::{BUILTIN_REFRESH_WORKER, BundleLibrary, InstalledBundle};
pub use refresh::RefreshCoordinator;
pub use sessions::{LifecycleEvent, Session, SessionRegistry, SessionSnapshot, SessionState};
pub use signing::{BundleSigner, CommandSigner};
pub use staging::BundleTransaction;
pub use window::{WindowDecoration, WindowMode};

// Re-export logging initialization
pub use logging::init_logging;
