//! Per-window presentation state.
//!
//! A [`WindowDecoration`] is the single source of truth an observer (dock,
//! window bar, session list) queries for what to draw for one guest window.
//! It is decoupled from process lifecycle so the UI stays responsive while
//! process teardown completes asynchronously: a session drives it through
//! lifecycle events, the user drives it through gestures.

pub mod decoration;
pub mod errors;
pub mod types;

pub use decoration::WindowDecoration;
pub use errors::WindowError;
pub use types::{Point, Rect, Size, WindowMode};
