//! Rendering surfaces
//!
//! A rendering surface is the pixel target a window's draw commands land
//! on. Two strategies exist: `DirectSurface` draws straight into the visible
//! buffer, `DoubleBufferedSurface` draws into a back buffer that is presented
//! on `flush`. The strategy is picked once, from configuration, when the
//! window is created.

use log::debug;

use super::canvas::Canvas;

/// Errors raised by rendering surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Surface has been disposed")]
    Disposed,
}

/// The capability every rendering backend must provide
pub trait RenderingSurface: std::fmt::Debug {
    /// Resize the device-pixel backing store. Returns false, and leaves the
    /// store untouched, if the dimensions are unchanged.
    fn set_bounds(&mut self, width: u32, height: u32) -> bool;

    /// Logical-to-device pixel multiplier used by subsequent draws
    fn scaling_ratio(&self) -> f64;

    /// Change the scaling ratio. Already rendered pixels are not rescaled.
    fn set_scaling_ratio(&mut self, ratio: f64);

    /// Make everything drawn so far visible
    fn flush(&mut self);

    /// The buffer draw commands write into
    fn canvas_mut(&mut self) -> Result<&mut Canvas, SurfaceError>;

    /// The buffer currently visible on screen
    fn visible(&self) -> &Canvas;

    /// Release the backing stores. Further draws fail and flushes do nothing.
    fn dispose(&mut self);

    /// Check whether the surface was disposed
    fn is_disposed(&self) -> bool;

    /// Width in device pixels
    fn width(&self) -> u32 {
        self.visible().width()
    }

    /// Height in device pixels
    fn height(&self) -> u32 {
        self.visible().height()
    }
}

/// How a window's rendering surface buffers its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceStrategy {
    /// Draw straight into the visible buffer
    Direct,
    /// Draw into a back buffer, present on flush
    #[default]
    DoubleBuffered,
}

impl SurfaceStrategy {
    /// Parse a strategy name as used in configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(SurfaceStrategy::Direct),
            "double" | "double-buffered" | "double_buffered" => {
                Some(SurfaceStrategy::DoubleBuffered)
            }
            _ => None,
        }
    }

    /// Create a surface of this strategy
    pub fn create(self, width: u32, height: u32, scaling_ratio: f64) -> Box<dyn RenderingSurface> {
        match self {
            SurfaceStrategy::Direct => Box::new(DirectSurface::new(width, height, scaling_ratio)),
            SurfaceStrategy::DoubleBuffered => {
                Box::new(DoubleBufferedSurface::new(width, height, scaling_ratio))
            }
        }
    }
}

/// Surface whose draws are immediately visible
#[derive(Debug)]
pub struct DirectSurface {
    canvas: Canvas,
    scaling_ratio: f64,
    disposed: bool,
}

impl DirectSurface {
    /// Create a new direct surface
    pub fn new(width: u32, height: u32, scaling_ratio: f64) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            scaling_ratio,
            disposed: false,
        }
    }
}

impl RenderingSurface for DirectSurface {
    fn set_bounds(&mut self, width: u32, height: u32) -> bool {
        if self.disposed {
            return false;
        }
        self.canvas.resize(width, height)
    }

    fn scaling_ratio(&self) -> f64 {
        self.scaling_ratio
    }

    fn set_scaling_ratio(&mut self, ratio: f64) {
        self.scaling_ratio = ratio;
    }

    fn flush(&mut self) {}

    fn canvas_mut(&mut self) -> Result<&mut Canvas, SurfaceError> {
        if self.disposed {
            return Err(SurfaceError::Disposed);
        }
        Ok(&mut self.canvas)
    }

    fn visible(&self) -> &Canvas {
        &self.canvas
    }

    fn dispose(&mut self) {
        self.canvas.release();
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Surface that draws off-screen and presents on flush
#[derive(Debug)]
pub struct DoubleBufferedSurface {
    front: Canvas,
    back: Canvas,
    scaling_ratio: f64,
    presents: u64,
    disposed: bool,
}

impl DoubleBufferedSurface {
    /// Create a new double-buffered surface
    pub fn new(width: u32, height: u32, scaling_ratio: f64) -> Self {
        Self {
            front: Canvas::new(width, height),
            back: Canvas::new(width, height),
            scaling_ratio,
            presents: 0,
            disposed: false,
        }
    }

    /// The off-screen buffer
    pub fn back(&self) -> &Canvas {
        &self.back
    }

    /// Number of times the back buffer was presented
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl RenderingSurface for DoubleBufferedSurface {
    fn set_bounds(&mut self, width: u32, height: u32) -> bool {
        if self.disposed {
            return false;
        }
        let back = self.back.resize(width, height);
        let front = self.front.resize(width, height);
        back || front
    }

    fn scaling_ratio(&self) -> f64 {
        self.scaling_ratio
    }

    fn set_scaling_ratio(&mut self, ratio: f64) {
        self.scaling_ratio = ratio;
    }

    // Draw commands are incremental, so the back buffer keeps its content
    // and presenting copies it forward instead of exchanging the buffers.
    fn flush(&mut self) {
        if self.disposed {
            return;
        }
        self.front.copy_from(&self.back);
        self.presents += 1;
    }

    fn canvas_mut(&mut self) -> Result<&mut Canvas, SurfaceError> {
        if self.disposed {
            return Err(SurfaceError::Disposed);
        }
        Ok(&mut self.back)
    }

    fn visible(&self) -> &Canvas {
        &self.front
    }

    fn dispose(&mut self) {
        debug!("Disposing double-buffered surface after {} presents", self.presents);
        self.front.release();
        self.back.release();
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
