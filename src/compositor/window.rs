//! Window management
//!
//! This module maps host windows to client-side windows: a rendering
//! surface with its draw queue, plus the header and border decorations and
//! any overlay children stacked on top.

use log::debug;

use super::geometry::{LayoutContext, Rect};
use super::node::{BorderNode, HeaderNode, OverlayChild, OverlayId, PositionableNode};
use crate::renderer::{
    DrawCommand, DrawCommandProcessor, DrawQueue, FrameReport, ImageCache, PaintCommand,
    RenderingSurface, SurfaceStrategy,
};

/// Spacing between the z-indices of consecutive host z-orders. Leaves room
/// for the border below a window and its overlay children above it.
pub const WINDOW_Z_STEP: i32 = 10;

/// Host z-orders are clamped to this range so every derived z-index fits
const MAX_Z_ORDER: i32 = i32::MAX / WINDOW_Z_STEP - 1;
const MIN_Z_ORDER: i32 = -MAX_Z_ORDER;

/// Z-index of a window at host stacking position `z_order`
pub fn z_index_for(z_order: i32) -> i32 {
    z_order.clamp(MIN_Z_ORDER, MAX_Z_ORDER) * WINDOW_Z_STEP
}

/// Host-assigned window identifier, stable for the window's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// What kind of host window this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    /// Regular top-level window
    #[default]
    Plain,
    /// Dialog or popup
    Popup,
    /// Window owned by the IDE frame, which draws its own chrome
    IdeWindow,
    /// Wrapper around a heavyweight component
    Heavyweight,
}

/// Window state as announced by the host
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub id: WindowId,
    pub visible: bool,
    /// Host stacking order, higher is on top
    pub z_order: i32,
    /// Bounds in host logical units
    pub bounds: Rect,
    pub resizable: bool,
    pub modal: bool,
    pub undecorated: bool,
    pub kind: WindowKind,
    pub title: Option<String>,
    /// Header height override in host units; zero or unset means theme default
    pub header_height: Option<f64>,
}

impl WindowDescriptor {
    /// Create a visible, decorated, resizable plain window
    pub fn new(id: WindowId, bounds: Rect) -> Self {
        Self {
            id,
            visible: true,
            z_order: 0,
            bounds,
            resizable: true,
            modal: false,
            undecorated: false,
            kind: WindowKind::Plain,
            title: None,
            header_height: None,
        }
    }

    pub fn with_kind(mut self, kind: WindowKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_undecorated(mut self, undecorated: bool) -> Self {
        self.undecorated = undecorated;
        self
    }

    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = Some(height);
        self
    }

    /// Only decorated windows that do not draw their own chrome get a header
    pub fn has_header(&self) -> bool {
        !self.undecorated && !matches!(self.kind, WindowKind::IdeWindow | WindowKind::Popup)
    }

    /// Header height in host units
    pub fn effective_header_height(&self, layout: &LayoutContext) -> f64 {
        match self.header_height {
            Some(height) if height > 0.0 => height,
            _ => layout.default_header_height,
        }
    }
}

/// A single host-originated change to a window
#[derive(Debug, Clone, PartialEq)]
pub enum WindowUpdate {
    Bounds(Rect),
    Visibility(bool),
    Title(Option<String>),
    ZOrder(i32),
    HeaderHeight(Option<f64>),
}

/// Window lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLifecycle {
    Visible,
    Hidden,
    /// Terminal; surface and decorations are released
    Disposed,
}

/// A client-side window
#[derive(Debug)]
pub struct Window<C = PaintCommand> {
    descriptor: WindowDescriptor,
    lifecycle: WindowLifecycle,
    z_index: i32,
    /// Content bounds in CSS space
    css_bounds: Rect,
    header: Option<HeaderNode>,
    border: BorderNode,
    overlays: Vec<OverlayChild>,
    next_overlay: u64,
    surface: Box<dyn RenderingSurface>,
    queue: DrawQueue<C>,
    processor: DrawCommandProcessor,
    /// Number of layout passes, for observing redundant work
    relayouts: u64,
}

impl<C: DrawCommand> Window<C> {
    /// Create a window from a host descriptor
    pub fn new(descriptor: WindowDescriptor, layout: &LayoutContext, strategy: SurfaceStrategy) -> Self {
        let z_index = z_index_for(descriptor.z_order);
        let header = descriptor.has_header().then(|| HeaderNode {
            bounds: Rect::default(),
            z_index,
            title: descriptor.title.clone(),
        });
        let lifecycle = if descriptor.visible {
            WindowLifecycle::Visible
        } else {
            WindowLifecycle::Hidden
        };

        let mut window = Self {
            descriptor,
            lifecycle,
            z_index,
            css_bounds: Rect::default(),
            header,
            border: BorderNode {
                bounds: Rect::default(),
                z_index: z_index.saturating_sub(1),
            },
            overlays: Vec::new(),
            next_overlay: 1,
            surface: strategy.create(0, 0, layout.scaling.pixel_ratio()),
            queue: DrawQueue::new(),
            processor: DrawCommandProcessor::new(),
            relayouts: 0,
        };
        window.relayout(layout);
        window
    }

    pub fn id(&self) -> WindowId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &WindowDescriptor {
        &self.descriptor
    }

    pub fn lifecycle(&self) -> WindowLifecycle {
        self.lifecycle
    }

    pub fn is_visible(&self) -> bool {
        self.lifecycle == WindowLifecycle::Visible
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == WindowLifecycle::Disposed
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Content bounds in CSS space
    pub fn css_bounds(&self) -> Rect {
        self.css_bounds
    }

    pub fn header(&self) -> Option<&HeaderNode> {
        self.header.as_ref()
    }

    pub fn border(&self) -> &BorderNode {
        &self.border
    }

    pub fn overlays(&self) -> &[OverlayChild] {
        &self.overlays
    }

    pub fn surface(&self) -> &dyn RenderingSurface {
        self.surface.as_ref()
    }

    pub fn queue(&self) -> &DrawQueue<C> {
        &self.queue
    }

    pub fn processor(&self) -> &DrawCommandProcessor {
        &self.processor
    }

    pub fn relayouts(&self) -> u64 {
        self.relayouts
    }

    /// Apply new host bounds. Returns false if they are unchanged.
    pub fn set_bounds(&mut self, bounds: Rect, layout: &LayoutContext) -> bool {
        if self.is_disposed() || self.descriptor.bounds == bounds {
            return false;
        }
        self.descriptor.bounds = bounds;
        self.relayout(layout);
        true
    }

    /// Restack the window and everything attached to it. Returns false,
    /// without notifying children, if the value is unchanged.
    pub fn set_z_index(&mut self, z_index: i32) -> bool {
        if self.is_disposed() || self.z_index == z_index {
            return false;
        }
        self.z_index = z_index;
        self.border.z_index = z_index.saturating_sub(1);
        if let Some(header) = &mut self.header {
            header.z_index = z_index;
        }
        for child in &mut self.overlays {
            child.on_parent_z_index_changed(z_index);
        }
        true
    }

    /// Show or hide the window. The surface survives either way.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let next = if visible {
            WindowLifecycle::Visible
        } else {
            WindowLifecycle::Hidden
        };
        if self.is_disposed() || self.lifecycle == next {
            return false;
        }
        self.lifecycle = next;
        self.descriptor.visible = visible;
        true
    }

    pub fn set_title(&mut self, title: Option<String>) -> bool {
        if self.is_disposed() || self.descriptor.title == title {
            return false;
        }
        if let Some(header) = &mut self.header {
            header.title = title.clone();
        }
        self.descriptor.title = title;
        true
    }

    pub fn set_header_height(&mut self, height: Option<f64>, layout: &LayoutContext) -> bool {
        if self.is_disposed() || self.descriptor.header_height == height {
            return false;
        }
        self.descriptor.header_height = height;
        self.relayout(layout);
        true
    }

    /// Apply a single host update
    pub fn apply_update(&mut self, update: WindowUpdate, layout: &LayoutContext) -> bool {
        match update {
            WindowUpdate::Bounds(bounds) => self.set_bounds(bounds, layout),
            WindowUpdate::Visibility(visible) => self.set_visible(visible),
            WindowUpdate::Title(title) => self.set_title(title),
            WindowUpdate::ZOrder(z_order) => self.set_z_index(z_index_for(z_order)),
            WindowUpdate::HeaderHeight(height) => self.set_header_height(height, layout),
        }
    }

    /// Bring the window in line with a full descriptor from the host
    pub fn refresh(&mut self, descriptor: WindowDescriptor, layout: &LayoutContext) -> bool {
        if self.is_disposed() || self.descriptor == descriptor {
            return false;
        }

        let needs_layout = self.descriptor.bounds != descriptor.bounds
            || self.descriptor.header_height != descriptor.header_height
            || self.descriptor.has_header() != descriptor.has_header();
        let z_index = z_index_for(descriptor.z_order);
        let visible = descriptor.visible;

        self.header = match (self.header.take(), descriptor.has_header()) {
            (Some(mut header), true) => {
                header.title = descriptor.title.clone();
                Some(header)
            }
            (None, true) => Some(HeaderNode {
                bounds: Rect::default(),
                z_index: self.z_index,
                title: descriptor.title.clone(),
            }),
            (_, false) => None,
        };
        self.descriptor = descriptor;

        if needs_layout {
            self.relayout(layout);
        }
        self.set_z_index(z_index);
        self.set_visible(visible);
        true
    }

    /// Recompute every derived bound after a scaling change
    pub(crate) fn update_layout(&mut self, layout: &LayoutContext) {
        if !self.is_disposed() {
            self.relayout(layout);
        }
    }

    /// Attach an overlay child `layer` levels above the window
    pub fn attach_overlay(&mut self, bounds: Rect, layer: i32) -> Option<OverlayId> {
        if self.is_disposed() {
            return None;
        }
        let id = OverlayId(self.next_overlay);
        let parent = self.id();
        self.next_overlay += 1;
        self.overlays
            .push(OverlayChild::new(id, parent, bounds, layer, self.z_index));
        Some(id)
    }

    /// Detach and destroy an overlay child
    pub fn detach_overlay(&mut self, id: OverlayId) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|child| child.id() != id);
        self.overlays.len() != before
    }

    pub fn overlay_mut(&mut self, id: OverlayId) -> Option<&mut OverlayChild> {
        self.overlays.iter_mut().find(|child| child.id() == id)
    }

    /// Queue a draw batch for the next frame
    pub fn enqueue<I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = C>,
    {
        self.queue.enqueue(batch)
    }

    /// Apply this frame's draw work and flush the surface
    pub fn render_frame(&mut self, images: &mut ImageCache) -> FrameReport {
        if self.is_disposed() {
            return FrameReport::default();
        }
        self.processor
            .render_frame(&mut self.queue, self.surface.as_mut(), images)
    }

    /// Release the surface, decorations and children. Safe to call again.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        debug!("Disposing window {:?}", self.id());
        self.queue.dispose();
        self.surface.dispose();
        self.overlays.clear();
        self.header = None;
        self.lifecycle = WindowLifecycle::Disposed;
        true
    }

    /// Every stackable element of this window, unsorted
    pub fn nodes(&self) -> Vec<PositionableNode<'_>> {
        if self.is_disposed() {
            return Vec::new();
        }

        let id = self.id();
        let mut nodes = vec![
            PositionableNode::Border {
                id,
                node: &self.border,
            },
            PositionableNode::Window {
                id,
                bounds: self.css_bounds,
                z_index: self.z_index,
            },
        ];
        if let Some(header) = &self.header {
            nodes.push(PositionableNode::Header { id, node: header });
        }
        nodes.extend(
            self.overlays
                .iter()
                .map(|child| PositionableNode::Overlay { id, node: child }),
        );
        nodes
    }

    fn relayout(&mut self, layout: &LayoutContext) {
        let scaling = layout.scaling;
        let css = scaling.to_css(self.descriptor.bounds);
        let header_height = self.descriptor.effective_header_height(layout) * scaling.user_ratio;

        self.css_bounds = css;
        if let Some(header) = &mut self.header {
            header.bounds = Rect::new(css.x, css.y - header_height, css.width, header_height);
        }
        self.border.bounds = css.extended(layout.border_thickness * scaling.user_ratio);

        let device = scaling.to_device(self.descriptor.bounds).to_pixels();
        self.surface.set_scaling_ratio(scaling.pixel_ratio());
        self.surface.set_bounds(device.width, device.height);
        self.relayouts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::ScalingContext;

    fn layout(user: f64, device: f64) -> LayoutContext {
        LayoutContext {
            scaling: ScalingContext::new(user, device),
            default_header_height: 28.0,
            border_thickness: 4.0,
        }
    }

    fn window(descriptor: WindowDescriptor) -> Window {
        Window::new(descriptor, &layout(1.0, 1.0), SurfaceStrategy::Direct)
    }

    fn window_at(id: WindowId, z_order: i32) -> Window {
        window(WindowDescriptor::new(id, Rect::default()).with_z_order(z_order))
    }

    #[test]
    fn test_header_rules() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let plain = WindowDescriptor::new(WindowId(1), bounds);
        assert!(plain.has_header());
        assert!(plain.clone().with_kind(WindowKind::Heavyweight).has_header());
        assert!(!plain.clone().with_kind(WindowKind::Popup).has_header());
        assert!(!plain.clone().with_kind(WindowKind::IdeWindow).has_header());
        assert!(!plain.with_undecorated(true).has_header());
    }

    #[test]
    fn test_bounds_scaling() {
        let descriptor = WindowDescriptor::new(WindowId(1), Rect::new(10.0, 50.0, 200.0, 100.0));
        let window: Window = Window::new(descriptor, &layout(2.0, 1.5), SurfaceStrategy::Direct);

        assert_eq!(window.css_bounds(), Rect::new(20.0, 100.0, 400.0, 200.0));
        assert_eq!(window.surface().width(), 600);
        assert_eq!(window.surface().height(), 300);
        assert_eq!(window.surface().scaling_ratio(), 3.0);

        let header = window.header().unwrap();
        assert_eq!(header.bounds, Rect::new(20.0, 44.0, 400.0, 56.0));
        assert_eq!(window.border().bounds, Rect::new(12.0, 92.0, 416.0, 216.0));
    }

    #[test]
    fn test_header_height_override() {
        let bounds = Rect::new(0.0, 100.0, 50.0, 50.0);
        let custom = window(WindowDescriptor::new(WindowId(1), bounds).with_header_height(40.0));
        assert_eq!(custom.header().unwrap().bounds.y, 60.0);

        let themed = window(WindowDescriptor::new(WindowId(2), bounds).with_header_height(0.0));
        assert_eq!(themed.header().unwrap().bounds.height, 28.0);
    }

    #[test]
    fn test_z_index_propagation() {
        let mut window = window(WindowDescriptor::new(WindowId(1), Rect::default()).with_z_order(1));
        let low = window.attach_overlay(Rect::default(), 1).unwrap();
        let high = window.attach_overlay(Rect::default(), 3).unwrap();

        assert_eq!(window.z_index(), 10);
        assert_eq!(window.border().z_index, 9);

        assert!(window.set_z_index(50));
        assert_eq!(window.border().z_index, 49);
        assert_eq!(window.header().unwrap().z_index, 50);

        let low = window.overlay_mut(low).unwrap().z_index();
        let high = window.overlay_mut(high).unwrap().z_index();
        assert!(low > 50 && high > 50);
        assert!(low < high);
    }

    #[test]
    fn test_extreme_z_order() {
        let mut window = window(WindowDescriptor::new(WindowId(1), Rect::default()).with_z_order(1));
        let child = window.attach_overlay(Rect::default(), 3).unwrap();
        let layout = layout(1.0, 1.0);

        assert!(window.apply_update(WindowUpdate::ZOrder(300_000_000), &layout));
        assert!(window.z_index() > 10);
        assert!(window.border().z_index < window.z_index());
        assert!(window.overlay_mut(child).unwrap().z_index() > window.z_index());

        // Both land on the top of the clamped range
        assert!(!window.apply_update(WindowUpdate::ZOrder(i32::MAX), &layout));

        assert!(window.apply_update(WindowUpdate::ZOrder(i32::MIN), &layout));
        assert!(window.z_index() < 0);
        assert!(window.border().z_index < window.z_index());
        assert!(window.overlay_mut(child).unwrap().z_index() > window.z_index());

        let top = window_at(WindowId(2), i32::MAX);
        assert!(top.border().z_index < top.z_index());
        assert!(z_index_for(300_000_000) >= z_index_for(200_000_000));
    }

    #[test]
    fn test_unchanged_values_are_noops() {
        let bounds = Rect::new(5.0, 5.0, 20.0, 20.0);
        let mut window = window(WindowDescriptor::new(WindowId(1), bounds).with_z_order(2));
        let child = window.attach_overlay(Rect::default(), 1).unwrap();
        let relayouts = window.relayouts();

        assert!(!window.set_bounds(bounds, &layout(1.0, 1.0)));
        assert!(!window.set_z_index(20));
        assert_eq!(window.relayouts(), relayouts);
        assert_eq!(window.overlay_mut(child).unwrap().notifications(), 0);

        assert!(window.set_bounds(Rect::new(6.0, 5.0, 20.0, 20.0), &layout(1.0, 1.0)));
        assert_eq!(window.relayouts(), relayouts + 1);
    }

    #[test]
    fn test_visibility_keeps_surface() {
        let mut window = window(WindowDescriptor::new(WindowId(1), Rect::new(0.0, 0.0, 8.0, 8.0)));
        assert!(window.set_visible(false));
        assert!(!window.set_visible(false));
        assert_eq!(window.lifecycle(), WindowLifecycle::Hidden);
        assert!(!window.surface().is_disposed());
        assert_eq!(window.surface().width(), 8);

        assert!(window.set_visible(true));
        assert!(window.is_visible());
    }

    #[test]
    fn test_dispose_is_idempotent_and_terminal() {
        let mut window = window(WindowDescriptor::new(WindowId(1), Rect::new(0.0, 0.0, 8.0, 8.0)));
        window.attach_overlay(Rect::default(), 1);
        window.enqueue([PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: 1,
        }]);

        assert!(window.dispose());
        assert!(!window.dispose());
        assert!(window.surface().is_disposed());
        assert!(window.overlays().is_empty());
        assert!(window.header().is_none());
        assert!(window.nodes().is_empty());

        assert!(!window.set_visible(true));
        assert!(!window.enqueue(Vec::new()));
        assert_eq!(window.render_frame(&mut ImageCache::new()), FrameReport::default());
        assert_eq!(window.lifecycle(), WindowLifecycle::Disposed);
    }

    #[test]
    fn test_refresh_from_descriptor() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut window = window(WindowDescriptor::new(WindowId(1), bounds));

        let updated = WindowDescriptor::new(WindowId(1), Rect::new(0.0, 0.0, 20.0, 10.0))
            .with_title("Settings")
            .with_z_order(3)
            .with_undecorated(true);
        assert!(window.refresh(updated.clone(), &layout(1.0, 1.0)));

        assert!(window.header().is_none());
        assert_eq!(window.z_index(), 30);
        assert_eq!(window.surface().width(), 20);
        assert_eq!(window.descriptor().title.as_deref(), Some("Settings"));

        assert!(!window.refresh(updated, &layout(1.0, 1.0)));
    }

    #[test]
    fn test_render_frame_draws() {
        let mut window = window(WindowDescriptor::new(WindowId(1), Rect::new(0.0, 0.0, 4.0, 4.0)));
        window.enqueue([PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            color: 0xFF00_0001,
        }]);

        let report = window.render_frame(&mut ImageCache::new());
        assert_eq!(report.applied, 1);
        assert_eq!(window.surface().visible().pixel(1, 1), Some(0xFF00_0001));
    }
}
