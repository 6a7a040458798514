//! Geometry and coordinate-space conversion
//!
//! Three coordinate spaces are in play:
//! - host logical units, as reported by the remote application
//! - CSS-equivalent client units, host units scaled by the user ratio
//! - device pixels, client units scaled by the device pixel ratio

/// A rectangle in floating point units (host logical or client CSS space)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Multiply every component by `ratio`
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            x: self.x * ratio,
            y: self.y * ratio,
            width: self.width * ratio,
            height: self.height * ratio,
        }
    }

    /// Grow the rectangle outward by `amount` on every side
    pub fn extended(&self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// Check whether a point lies inside the rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Snap to whole pixels. Edges are rounded independently so adjacent
    /// rectangles keep sharing an edge after snapping.
    pub fn to_pixels(&self) -> PixelRect {
        let left = self.x.round();
        let top = self.y.round();
        let right = self.right().round();
        let bottom = self.bottom().round();

        PixelRect {
            x: left as i32,
            y: top as i32,
            width: (right - left).max(0.0) as u32,
            height: (bottom - top).max(0.0) as u32,
        }
    }
}

/// A rectangle in whole device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create a new pixel rectangle
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The two independent scaling factors applied to host geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingContext {
    /// User-configurable zoom
    pub user_ratio: f64,
    /// Device pixel ratio of the local display
    pub device_ratio: f64,
}

impl ScalingContext {
    /// Create a new scaling context
    pub const fn new(user_ratio: f64, device_ratio: f64) -> Self {
        Self {
            user_ratio,
            device_ratio,
        }
    }

    /// Logical-to-device multiplier used by rendering surfaces
    pub fn pixel_ratio(&self) -> f64 {
        self.user_ratio * self.device_ratio
    }

    /// Host logical bounds to on-screen CSS bounds
    pub fn to_css(&self, host: Rect) -> Rect {
        host.scaled(self.user_ratio)
    }

    /// Host logical bounds to backing-store pixel bounds
    pub fn to_device(&self, host: Rect) -> Rect {
        host.scaled(self.pixel_ratio())
    }

    /// On-screen CSS bounds to device pixels
    pub fn css_to_device(&self, css: Rect) -> PixelRect {
        css.scaled(self.device_ratio).to_pixels()
    }

    /// Convert a CSS-space length back to host logical units
    pub fn css_to_host(&self, value: f64) -> f64 {
        value / self.user_ratio
    }
}

impl Default for ScalingContext {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Everything window layout depends on besides the window itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub scaling: ScalingContext,
    /// Theme header height in host units, used when a window does not override it
    pub default_header_height: f64,
    /// Border thickness in host units
    pub border_thickness: f64,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            scaling: ScalingContext::default(),
            default_header_height: 28.0,
            border_thickness: 4.0,
        }
    }
}
