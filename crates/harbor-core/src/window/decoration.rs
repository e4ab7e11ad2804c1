use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::window::errors::WindowError;
use crate::window::types::{Point, Rect, Size, WindowMode};

/// Smallest window the decoration chrome can usefully draw.
pub const MIN_WINDOW_SIZE: Size = Size {
    width: 240.0,
    height: 180.0,
};

/// Geometry and scale saved before maximize/minimize so restore can put the
/// window back exactly where it was.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct SavedPlacement {
    frame: Rect,
    scale_ratio: f64,
}

/// Presentation state of one guest window.
///
/// `Normal` owns its geometry; `Maximized` overrides it with the full
/// presentable bounds at scale 1.0; `Minimized` keeps the pre-minimize
/// placement for restore; `Closed` is terminal.
#[derive(Debug, Clone)]
pub struct WindowDecoration {
    session_id: String,
    display_name: String,
    mode: WindowMode,
    frame: Rect,
    scale_ratio: f64,
    bounds: Rect,
    initial_frame: Rect,
    saved: Option<SavedPlacement>,
    exited_unexpectedly: bool,
}

impl WindowDecoration {
    /// Create a decoration in `Normal` mode. The initial frame is clamped
    /// to the presentable bounds.
    pub fn new(
        session_id: impl Into<String>,
        display_name: impl Into<String>,
        frame: Rect,
        bounds: Rect,
    ) -> Self {
        let frame = clamp_frame(frame, bounds);
        Self {
            session_id: session_id.into(),
            display_name: display_name.into(),
            mode: WindowMode::Normal,
            frame,
            scale_ratio: 1.0,
            bounds,
            initial_frame: frame,
            saved: None,
            exited_unexpectedly: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Current frame. In `Maximized` mode this is the full presentable
    /// bounds; in `Minimized` mode it is the frame the window will restore
    /// to.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Content pixels per point. Pinned to 1.0 while maximized.
    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    pub fn exited_unexpectedly(&self) -> bool {
        self.exited_unexpectedly
    }

    /// `Normal ⇄ Maximized`. A no-op from `Minimized` and `Closed`.
    pub fn toggle_maximize(&mut self) {
        match self.mode {
            WindowMode::Normal => {
                self.saved = Some(SavedPlacement {
                    frame: self.frame,
                    scale_ratio: self.scale_ratio,
                });
                self.frame = self.bounds;
                self.scale_ratio = 1.0;
                self.mode = WindowMode::Maximized;
                debug!(
                    event = "core.window.maximized",
                    session_id = self.session_id
                );
            }
            WindowMode::Maximized => {
                self.restore_saved_placement();
                self.mode = WindowMode::Normal;
                debug!(
                    event = "core.window.unmaximized",
                    session_id = self.session_id
                );
            }
            WindowMode::Minimized | WindowMode::Closed => {}
        }
    }

    /// Any non-terminal mode → `Minimized`.
    pub fn minimize(&mut self) -> Result<(), WindowError> {
        match self.mode {
            WindowMode::Closed => Err(WindowError::InvalidInState {
                operation: "minimize",
                mode: self.mode,
            }),
            WindowMode::Minimized => Ok(()),
            WindowMode::Normal | WindowMode::Maximized => {
                self.saved = Some(SavedPlacement {
                    frame: self.frame,
                    scale_ratio: self.scale_ratio,
                });
                self.mode = WindowMode::Minimized;
                debug!(
                    event = "core.window.minimized",
                    session_id = self.session_id
                );
                Ok(())
            }
        }
    }

    /// `Minimized → Normal`, with exactly the pre-minimize geometry and
    /// scale.
    pub fn restore(&mut self) -> Result<(), WindowError> {
        if self.mode != WindowMode::Minimized {
            return Err(WindowError::InvalidInState {
                operation: "restore",
                mode: self.mode,
            });
        }
        self.restore_saved_placement();
        self.mode = WindowMode::Normal;
        debug!(
            event = "core.window.restored",
            session_id = self.session_id
        );
        Ok(())
    }

    /// Any mode → `Closed`. Idempotent.
    pub fn close(&mut self) {
        if self.mode == WindowMode::Closed {
            return;
        }
        self.mode = WindowMode::Closed;
        debug!(event = "core.window.closed", session_id = self.session_id);
    }

    /// Marks the closed/closing window as the result of a guest crash
    /// rather than a user gesture, so the UI can say so instead of letting
    /// the window silently disappear.
    pub fn mark_exited_unexpectedly(&mut self) {
        self.exited_unexpectedly = true;
    }

    /// Reopen a closed window at its initial placement. Used when a
    /// terminated session is started again.
    pub fn reopen(&mut self) {
        self.mode = WindowMode::Normal;
        self.frame = self.initial_frame;
        self.scale_ratio = 1.0;
        self.saved = None;
        self.exited_unexpectedly = false;
    }

    /// Resize the window. Valid only in `Normal` mode; the result is
    /// clamped to the presentable bounds and the minimum window size.
    pub fn resize(&mut self, new_size: Size) -> Result<(), WindowError> {
        self.require_normal("resize")?;
        if !new_size.width.is_finite() || !new_size.height.is_finite() {
            return Err(WindowError::InvalidArgument {
                message: format!("size must be finite, got {}x{}", new_size.width, new_size.height),
            });
        }
        let size = Size::new(
            new_size.width.max(MIN_WINDOW_SIZE.width),
            new_size.height.max(MIN_WINDOW_SIZE.height),
        );
        self.frame.size = self.bounds.clamp_size(size);
        self.frame.origin = self.bounds.clamp_origin(self.frame.origin, self.frame.size);
        Ok(())
    }

    /// Move the window. Valid only in `Normal` mode; the origin is clamped
    /// so the window stays within the presentable bounds.
    pub fn reposition(&mut self, new_origin: Point) -> Result<(), WindowError> {
        self.require_normal("reposition")?;
        if !new_origin.x.is_finite() || !new_origin.y.is_finite() {
            return Err(WindowError::InvalidArgument {
                message: format!("origin must be finite, got ({}, {})", new_origin.x, new_origin.y),
            });
        }
        self.frame.origin = self.bounds.clamp_origin(new_origin, self.frame.size);
        Ok(())
    }

    /// Set the content scale ratio. Valid in any non-terminal mode; while
    /// maximized or minimized the new ratio takes effect on restore.
    pub fn set_scale(&mut self, ratio: f64) -> Result<(), WindowError> {
        if self.mode.is_terminal() {
            return Err(WindowError::InvalidInState {
                operation: "set scale",
                mode: self.mode,
            });
        }
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(WindowError::InvalidArgument {
                message: format!("scale ratio must be > 0, got {}", ratio),
            });
        }
        if self.mode == WindowMode::Normal {
            self.scale_ratio = ratio;
        } else if let Some(saved) = &mut self.saved {
            saved.scale_ratio = ratio;
        }
        Ok(())
    }

    fn require_normal(&self, operation: &'static str) -> Result<(), WindowError> {
        if self.mode != WindowMode::Normal {
            return Err(WindowError::InvalidInState {
                operation,
                mode: self.mode,
            });
        }
        Ok(())
    }

    fn restore_saved_placement(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.frame = saved.frame;
            self.scale_ratio = saved.scale_ratio;
        }
    }
}

fn clamp_frame(frame: Rect, bounds: Rect) -> Rect {
    let size = bounds.clamp_size(Size::new(
        frame.size.width.max(MIN_WINDOW_SIZE.width),
        frame.size.height.max(MIN_WINDOW_SIZE.height),
    ));
    let origin = bounds.clamp_origin(frame.origin, size);
    Rect { origin, size }
}
