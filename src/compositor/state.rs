//! Window compositor state
//!
//! This module contains the central client state: every window announced
//! by the host, the shared image cache, the pointer grab and the intents
//! waiting to be sent back to the host.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::geometry::{LayoutContext, PixelRect, Rect};
use super::interaction::{Grab, GrabKind, ResizeEdge, WindowIntent};
use super::node::{NodeKind, OverlayId, PositionableNode};
use super::window::{Window, WindowDescriptor, WindowId, WindowUpdate};
use crate::backend::FrameDriven;
use crate::config::{validate_ratio, ClientConfig, ConfigError};
use crate::renderer::{Canvas, DrawCommand, Image, ImageCache, ImageId, PaintCommand};

/// Compositor errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositorError {
    /// The host referenced a window that never existed or is already closed
    #[error("Unknown window {0:?}")]
    UnknownWindow(WindowId),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Window lifecycle notifications from the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    WindowCreated(WindowDescriptor),
    WindowUpdated { id: WindowId, update: WindowUpdate },
    WindowClosed(WindowId),
    /// The complete list of host windows; anything missing is closed
    WindowSet(Vec<WindowDescriptor>),
}

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTarget {
    pub window: WindowId,
    pub kind: NodeKind,
}

/// Totals for one frame across all windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSummary {
    /// Frame number, starting at 1
    pub frame: u64,
    pub windows: usize,
    pub applied: usize,
    /// Windows that ended the frame with pending commands
    pub stalled: usize,
}

/// The client-side window compositor
#[derive(Debug)]
pub struct WindowCompositor<C = PaintCommand> {
    config: ClientConfig,
    layout: LayoutContext,
    windows: HashMap<WindowId, Window<C>>,
    images: ImageCache,
    intents: Vec<WindowIntent>,
    grab: Option<Grab>,
    frames: u64,
}

impl<C: DrawCommand> WindowCompositor<C> {
    /// Create a compositor with no windows
    pub fn new(config: ClientConfig) -> Self {
        let layout = config.layout();
        info!(
            "Compositor ready: user scaling {}, device pixel ratio {}, {:?} surfaces",
            config.user_scaling_ratio, config.device_pixel_ratio, config.surface_strategy
        );
        Self {
            config,
            layout,
            windows: HashMap::new(),
            images: ImageCache::new(),
            intents: Vec::new(),
            grab: None,
            frames: 0,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn layout(&self) -> &LayoutContext {
        &self.layout
    }

    /// Apply a host lifecycle notification. Unknown windows are logged and
    /// ignored.
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::WindowCreated(descriptor) => {
                self.create_window(descriptor);
            }
            HostEvent::WindowUpdated { id, update } => {
                let _ = self.update_window(id, update);
            }
            HostEvent::WindowClosed(id) => {
                let _ = self.close_window(id);
            }
            HostEvent::WindowSet(descriptors) => self.apply_window_set(descriptors),
        }
    }

    /// Create a window, or refresh it if the id is already known
    pub fn create_window(&mut self, descriptor: WindowDescriptor) -> WindowId {
        let id = descriptor.id;
        if let Some(window) = self.windows.get_mut(&id) {
            debug!("Window {:?} announced again, refreshing", id);
            window.refresh(descriptor, &self.layout);
            return id;
        }

        debug!("Creating window {:?} at {:?}", id, descriptor.bounds);
        let window = Window::new(descriptor, &self.layout, self.config.surface_strategy);
        self.windows.insert(id, window);
        id
    }

    /// Apply a single host update to a window
    pub fn update_window(&mut self, id: WindowId, update: WindowUpdate) -> Result<bool, CompositorError> {
        let layout = self.layout;
        Ok(self.window_mut(id)?.apply_update(update, &layout))
    }

    /// Dispose and forget a window
    pub fn close_window(&mut self, id: WindowId) -> Result<(), CompositorError> {
        let Some(mut window) = self.windows.remove(&id) else {
            return Err(unknown_window(id));
        };
        window.dispose();
        if self.grab.is_some_and(|grab| grab.window == id) {
            self.grab = None;
        }
        debug!("Closed window {:?}", id);
        Ok(())
    }

    /// Synchronise with the host's complete window list
    pub fn apply_window_set(&mut self, descriptors: Vec<WindowDescriptor>) {
        let keep: HashSet<WindowId> = descriptors.iter().map(|d| d.id).collect();
        let gone: Vec<WindowId> = self
            .windows
            .keys()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();

        for id in gone {
            let _ = self.close_window(id);
        }
        for descriptor in descriptors {
            self.create_window(descriptor);
        }
    }

    /// Queue a draw batch for a window's next frame
    pub fn enqueue_draw<I>(&mut self, id: WindowId, batch: I) -> Result<(), CompositorError>
    where
        I: IntoIterator<Item = C>,
    {
        self.window_mut(id)?.enqueue(batch);
        Ok(())
    }

    /// Attach an overlay child to a window
    pub fn attach_overlay(&mut self, id: WindowId, bounds: Rect, layer: i32) -> Result<OverlayId, CompositorError> {
        self.window_mut(id)?
            .attach_overlay(bounds, layer)
            .ok_or_else(|| unknown_window(id))
    }

    /// Render one frame: every window applies its queued draw work
    pub fn render_frame(&mut self) -> FrameSummary {
        self.frames += 1;
        let mut summary = FrameSummary {
            frame: self.frames,
            windows: self.windows.len(),
            ..FrameSummary::default()
        };

        for window in self.windows.values_mut() {
            let report = window.render_frame(&mut self.images);
            summary.applied += report.applied;
            if report.is_stalled() {
                summary.stalled += 1;
            }
        }

        if summary.stalled > 0 {
            debug!(
                "Frame {}: {} of {} windows waiting on resources",
                summary.frame, summary.stalled, summary.windows
            );
        }
        summary
    }

    /// Store an image received from the host
    pub fn insert_image(&mut self, id: ImageId, image: Image) {
        self.images.insert(id, image);
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Images the host should send
    pub fn take_image_requests(&mut self) -> Vec<ImageId> {
        self.images.take_requests()
    }

    /// Change the user zoom and relayout every window
    pub fn set_user_scaling_ratio(&mut self, ratio: f64) -> Result<(), CompositorError> {
        self.config.user_scaling_ratio = validate_ratio(ClientConfig::USER_SCALING, ratio)?;
        self.rescale();
        Ok(())
    }

    /// Change the device pixel ratio and relayout every window
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) -> Result<(), CompositorError> {
        self.config.device_pixel_ratio = validate_ratio(ClientConfig::DEVICE_PIXEL_RATIO, ratio)?;
        self.rescale();
        Ok(())
    }

    pub fn window(&self, id: WindowId) -> Option<&Window<C>> {
        self.windows.get(&id)
    }

    /// Window ids in ascending order
    pub fn window_ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.windows.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Nodes of all visible windows, bottom to top
    pub fn stacking_order(&self) -> Vec<PositionableNode<'_>> {
        let mut windows: Vec<&Window<C>> = self.windows.values().filter(|w| w.is_visible()).collect();
        windows.sort_by_key(|w| (w.z_index(), w.id()));

        let mut nodes: Vec<PositionableNode<'_>> = windows.into_iter().flat_map(|w| w.nodes()).collect();
        // Stable, so nodes sharing a z-index keep window order
        nodes.sort_by_key(|node| node.z_index());
        nodes
    }

    /// Topmost node under a CSS-space point
    pub fn hit_test(&self, x: f64, y: f64) -> Option<HitTarget> {
        self.stacking_order()
            .iter()
            .rev()
            .find(|node| node.bounds().contains(x, y))
            .map(|node| HitTarget {
                window: node.window_id(),
                kind: node.kind(),
            })
    }

    /// Paint every visible window, with decorations, onto a device-pixel
    /// screen canvas
    pub fn compose(&self, screen: &mut Canvas) {
        let scaling = self.layout.scaling;
        let full = PixelRect::new(0, 0, screen.width(), screen.height());
        screen.fill_rect(full, self.config.background_color);

        for node in self.stacking_order() {
            let rect = scaling.css_to_device(node.bounds());
            match node {
                PositionableNode::Border { .. } => screen.fill_rect(rect, self.config.border_color),
                PositionableNode::Header { .. } => screen.fill_rect(rect, self.config.header_color),
                PositionableNode::Window { id, .. } => {
                    if let Some(window) = self.windows.get(&id) {
                        screen.blit(window.surface().visible(), rect.x, rect.y);
                    }
                }
                // Overlays are painted by their owners
                PositionableNode::Overlay { .. } => {}
            }
        }
    }

    /// Handle a pointer press at a CSS-space position. Starts a move grab on
    /// headers, a resize grab on borders of resizable windows, and asks the
    /// host to activate the window if it is not already on top.
    pub fn pointer_pressed(&mut self, x: f64, y: f64) -> Option<HitTarget> {
        let target = self.hit_test(x, y)?;
        let window = self.windows.get(&target.window)?;

        self.grab = match target.kind {
            NodeKind::Header => Some(Grab::new(target.window, GrabKind::Move, x, y)),
            NodeKind::Border if window.descriptor().resizable => {
                let content = window.css_bounds();
                let frame = match window.header() {
                    Some(header) => Rect::new(
                        content.x,
                        header.bounds.y,
                        content.width,
                        content.height + header.bounds.height,
                    ),
                    None => content,
                };
                ResizeEdge::from_point(frame, x, y)
                    .map(|edge| Grab::new(target.window, GrabKind::Resize(edge), x, y))
            }
            _ => None,
        };

        if self.topmost_window() != Some(target.window) {
            self.intents.push(WindowIntent::Activate { id: target.window });
        }
        Some(target)
    }

    /// Follow the pointer while a grab is active
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some(grab) = &mut self.grab {
            if let Some(intent) = grab.drag_to(x, y, &self.layout.scaling) {
                self.intents.push(intent);
            }
        }
    }

    /// End the current grab, if any
    pub fn pointer_released(&mut self) -> bool {
        self.grab.take().is_some()
    }

    pub fn grab(&self) -> Option<&Grab> {
        self.grab.as_ref()
    }

    /// Ask the host to close a window. The window stays until the host
    /// confirms with a close notification.
    pub fn request_close(&mut self, id: WindowId) -> Result<(), CompositorError> {
        self.window_mut(id)?;
        self.intents.push(WindowIntent::Close { id });
        Ok(())
    }

    /// Drain intents for the transport
    pub fn take_intents(&mut self) -> Vec<WindowIntent> {
        std::mem::take(&mut self.intents)
    }

    fn topmost_window(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| w.is_visible())
            .max_by_key(|w| (w.z_index(), w.id()))
            .map(|w| w.id())
    }

    fn rescale(&mut self) {
        self.layout = self.config.layout();
        info!(
            "Rescaling {} windows: user {}, device {}",
            self.windows.len(),
            self.config.user_scaling_ratio,
            self.config.device_pixel_ratio
        );
        for window in self.windows.values_mut() {
            window.update_layout(&self.layout);
        }
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut Window<C>, CompositorError> {
        self.windows.get_mut(&id).ok_or_else(|| unknown_window(id))
    }
}

impl<C: DrawCommand> FrameDriven for WindowCompositor<C> {
    fn on_frame(&mut self) {
        self.render_frame();
    }
}

fn unknown_window(id: WindowId) -> CompositorError {
    warn!("Ignoring request for unknown window {:?}", id);
    CompositorError::UnknownWindow(id)
}
