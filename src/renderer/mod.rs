//! Rendering module
//!
//! This module turns a window's stream of draw commands into pixels.
//! It includes the software canvas, the rendering surface strategies,
//! the image cache and the per-window draw queue and processor.

pub mod canvas;
pub mod command;
pub mod images;
pub mod processor;
pub mod queue;
pub mod surface;

pub use canvas::Canvas;
pub use command::{DrawCommand, DrawError, DrawTarget, PaintCommand};
pub use images::{Image, ImageCache, ImageId};
pub use processor::{DrawCommandProcessor, FrameReport, ProcessError};
pub use queue::{DrawQueue, QueueState};
pub use surface::{
    DirectSurface, DoubleBufferedSurface, RenderingSurface, SurfaceError, SurfaceStrategy,
};
