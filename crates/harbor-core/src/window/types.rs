use serde::{Deserialize, Serialize};

/// Presentation mode of one guest window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    #[default]
    Normal,
    Maximized,
    Minimized,
    Closed,
}

impl WindowMode {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WindowMode::Closed)
    }
}

impl std::fmt::Display for WindowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WindowMode::Normal => "normal",
            WindowMode::Maximized => "maximized",
            WindowMode::Minimized => "minimized",
            WindowMode::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// A position in the host's presentable coordinate space, in points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An origin plus a size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::default(),
            size,
        }
    }

    /// Clamp `size` so it fits inside this rect.
    pub fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            size.width.min(self.size.width),
            size.height.min(self.size.height),
        )
    }

    /// Clamp `origin` so a window of `size` at that origin stays inside
    /// this rect.
    pub fn clamp_origin(&self, origin: Point, size: Size) -> Point {
        let max_x = (self.origin.x + self.size.width - size.width).max(self.origin.x);
        let max_y = (self.origin.y + self.size.height - size.height).max(self.origin.y);
        Point::new(
            origin.x.clamp(self.origin.x, max_x),
            origin.y.clamp(self.origin.y, max_y),
        )
    }
}
