//! Software pixel buffer
//!
//! Pixels are stored as packed 32-bit ARGB, row-major, without padding.

use log::debug;

use crate::compositor::PixelRect;

/// Fully transparent pixel, the content of a freshly allocated canvas
pub const TRANSPARENT: u32 = 0x0000_0000;

/// A resizable ARGB pixel buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    /// Number of times the backing store was reallocated by `resize`
    reallocations: u64,
}

impl Canvas {
    /// Create a new transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
            reallocations: 0,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel data
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Get a single pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// How often `resize` had to reallocate
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// Resize the backing store. Resizing is destructive: the content is
    /// cleared. Returns false without touching anything when the size is
    /// unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }

        debug!(
            "Reallocating canvas {}x{} -> {}x{}",
            self.width, self.height, width, height
        );

        self.width = width;
        self.height = height;
        self.pixels = vec![TRANSPARENT; width as usize * height as usize];
        self.reallocations += 1;
        true
    }

    /// Drop the backing store
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pixels = Vec::new();
    }

    /// Fill a rectangle with a solid color, clipped to the canvas
    pub fn fill_rect(&mut self, rect: PixelRect, color: u32) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };

        for y in y0..y1 {
            let start = self.index(x0, y);
            let end = self.index(x1, y);
            self.pixels[start..end].fill(color);
        }
    }

    /// Reset a rectangle to transparent
    pub fn clear_rect(&mut self, rect: PixelRect) {
        self.fill_rect(rect, TRANSPARENT);
    }

    /// Draw `src` (a `src_width` x `src_height` ARGB image) stretched into
    /// `dest` with nearest-neighbour sampling
    pub fn draw_scaled(&mut self, src: &[u32], src_width: u32, src_height: u32, dest: PixelRect) {
        if src_width == 0 || src_height == 0 || dest.is_empty() {
            return;
        }
        if src.len() < src_width as usize * src_height as usize {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(dest) else {
            return;
        };

        for y in y0..y1 {
            let sy = ((y as i64 - dest.y as i64) * src_height as i64 / dest.height as i64) as usize;
            for x in x0..x1 {
                let sx =
                    ((x as i64 - dest.x as i64) * src_width as i64 / dest.width as i64) as usize;
                let index = self.index(x, y);
                self.pixels[index] = src[sy * src_width as usize + sx];
            }
        }
    }

    /// Copy another canvas onto this one with its top-left corner at (dx, dy)
    pub fn blit(&mut self, src: &Canvas, dx: i32, dy: i32) {
        let dest = PixelRect::new(dx, dy, src.width, src.height);
        let Some((x0, y0, x1, y1)) = self.clip(dest) else {
            return;
        };

        for y in y0..y1 {
            let sy = (y as i64 - dy as i64) as u32;
            let sx = (x0 as i64 - dx as i64) as u32;
            let src_start = src.index(sx, sy);
            let len = (x1 - x0) as usize;
            let start = self.index(x0, y);
            self.pixels[start..start + len].copy_from_slice(&src.pixels[src_start..src_start + len]);
        }
    }

    /// Make this canvas an exact copy of `src`, reallocating only if the
    /// sizes differ
    pub fn copy_from(&mut self, src: &Canvas) {
        self.resize(src.width, src.height);
        self.pixels.copy_from_slice(&src.pixels);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Intersect a rectangle with the canvas bounds as (x0, y0, x1, y1)
    fn clip(&self, rect: PixelRect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.max(0) as i64;
        let y0 = rect.y.max(0) as i64;
        let x1 = (rect.x as i64 + rect.width as i64).min(self.width as i64);
        let y1 = (rect.y as i64 + rect.height as i64).min(self.height as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
