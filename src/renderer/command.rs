//! Draw commands
//!
//! The processor treats commands as opaque: it only needs to know, in
//! order, whether each one applied. `PaintCommand` is the concrete command
//! set the client paints with.

use crate::compositor::Rect;

use super::canvas::Canvas;
use super::images::{ImageCache, ImageId};
use super::surface::SurfaceError;

/// Why a draw command could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// A referenced image has not arrived yet. Transient, retried next frame.
    #[error("Image {0:?} is not available yet")]
    ImageUnavailable(ImageId),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// What a draw command renders into
pub struct DrawTarget<'a> {
    canvas: &'a mut Canvas,
    scaling_ratio: f64,
    images: &'a mut ImageCache,
}

impl<'a> DrawTarget<'a> {
    /// Create a new draw target
    pub fn new(canvas: &'a mut Canvas, scaling_ratio: f64, images: &'a mut ImageCache) -> Self {
        Self {
            canvas,
            scaling_ratio,
            images,
        }
    }

    /// Canvas to draw on
    pub fn canvas(&mut self) -> &mut Canvas {
        self.canvas
    }

    /// Logical-to-device multiplier of the surface
    pub fn scaling_ratio(&self) -> f64 {
        self.scaling_ratio
    }

    /// Image cache, for commands that reference images
    pub fn images(&mut self) -> &mut ImageCache {
        self.images
    }
}

/// A unit of rendering work
pub trait DrawCommand {
    /// Apply the command. An error means nothing was drawn and the command
    /// may be retried later.
    fn apply(&self, target: &mut DrawTarget<'_>) -> Result<(), DrawError>;
}

/// Paint operations, in logical coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRect { rect: Rect, color: u32 },
    ClearRect { rect: Rect },
    DrawImage { image: ImageId, rect: Rect },
}

impl DrawCommand for PaintCommand {
    fn apply(&self, target: &mut DrawTarget<'_>) -> Result<(), DrawError> {
        let ratio = target.scaling_ratio;
        match self {
            PaintCommand::FillRect { rect, color } => {
                target.canvas.fill_rect(rect.scaled(ratio).to_pixels(), *color);
            }
            PaintCommand::ClearRect { rect } => {
                target.canvas.clear_rect(rect.scaled(ratio).to_pixels());
            }
            PaintCommand::DrawImage { image, rect } => {
                let Some(data) = target.images.get(*image) else {
                    target.images.request(*image);
                    return Err(DrawError::ImageUnavailable(*image));
                };
                target.canvas.draw_scaled(
                    data.pixels(),
                    data.width(),
                    data.height(),
                    rect.scaled(ratio).to_pixels(),
                );
            }
        }
        Ok(())
    }
}
