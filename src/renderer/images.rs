//! Image cache
//!
//! Images referenced by draw commands arrive from the host independently of
//! the commands themselves. A command that needs an image which is not here
//! yet fails transiently and leaves a request behind for the transport.

use std::collections::{HashMap, HashSet};

use log::debug;

/// Host-assigned image identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

/// Decoded ARGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Image {
    /// Wrap decoded pixels. Returns None if the pixel count does not match
    /// the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-color image
    pub fn solid(width: u32, height: u32, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

/// Cache of images received from the host
#[derive(Debug, Default)]
pub struct ImageCache {
    images: HashMap<ImageId, Image>,
    /// Images a draw command asked for that have not arrived yet
    requested: HashSet<ImageId>,
    /// Requests not yet handed to the transport, in request order
    outbox: Vec<ImageId>,
}

impl ImageCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an image, satisfying any outstanding request for it
    pub fn insert(&mut self, id: ImageId, image: Image) {
        debug!("Image {:?} arrived ({}x{})", id, image.width, image.height);
        self.requested.remove(&id);
        self.outbox.retain(|&pending| pending != id);
        self.images.insert(id, image);
    }

    /// Look up an image
    pub fn get(&self, id: ImageId) -> Option<&Image> {
        self.images.get(&id)
    }

    /// Check if an image is present
    pub fn contains(&self, id: ImageId) -> bool {
        self.images.contains_key(&id)
    }

    /// Record that an image is needed. Each missing image is requested once.
    pub fn request(&mut self, id: ImageId) -> bool {
        if self.images.contains_key(&id) || !self.requested.insert(id) {
            return false;
        }
        debug!("Requesting image {:?}", id);
        self.outbox.push(id);
        true
    }

    /// Check if an image was requested and has not arrived yet
    pub fn is_requested(&self, id: ImageId) -> bool {
        self.requested.contains(&id)
    }

    /// Drain requests for the transport
    pub fn take_requests(&mut self) -> Vec<ImageId> {
        std::mem::take(&mut self.outbox)
    }

    /// Remove an image
    pub fn remove(&mut self, id: ImageId) -> Option<Image> {
        self.images.remove(&id)
    }

    /// Number of cached images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
