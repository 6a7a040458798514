//! Positionable nodes
//!
//! Every element the compositor stacks has bounds and a z-index. A window is
//! the parent of its decorations and overlay children; the children follow
//! the window's z-index through an explicit notification, never by polling.

use super::geometry::Rect;
use super::window::{WindowId, WINDOW_Z_STEP};

/// Identifier of an overlay child, unique within its parent window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// Title bar drawn above a decorated window
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderNode {
    /// CSS-space bounds
    pub bounds: Rect,
    pub z_index: i32,
    pub title: Option<String>,
}

/// Frame drawn around a window
#[derive(Debug, Clone, PartialEq)]
pub struct BorderNode {
    /// CSS-space bounds
    pub bounds: Rect,
    pub z_index: i32,
}

/// An element stacked above its parent window
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayChild {
    id: OverlayId,
    /// Back-reference used only for z-index lookups, not ownership
    parent: WindowId,
    bounds: Rect,
    /// Distance above the parent's z-index, between 1 and `WINDOW_Z_STEP - 1`
    layer: i32,
    z_index: i32,
    notifications: u64,
}

impl OverlayChild {
    /// Create a child for `parent`, stacked `layer` levels above it. The
    /// layer is clamped so the child stays below the next host window.
    pub(crate) fn new(id: OverlayId, parent: WindowId, bounds: Rect, layer: i32, parent_z: i32) -> Self {
        let layer = layer.clamp(1, WINDOW_Z_STEP - 1);
        Self {
            id,
            parent,
            bounds,
            layer,
            z_index: parent_z.saturating_add(layer),
            notifications: 0,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn parent(&self) -> WindowId {
        self.parent
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// How often the parent announced a z-index change
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Move the child. Returns false if the bounds are unchanged.
    pub fn set_bounds(&mut self, bounds: Rect) -> bool {
        if self.bounds == bounds {
            return false;
        }
        self.bounds = bounds;
        true
    }

    /// Called by the parent whenever its z-index changes
    pub(crate) fn on_parent_z_index_changed(&mut self, parent_z: i32) {
        self.notifications += 1;
        self.z_index = parent_z.saturating_add(self.layer);
    }
}

/// Which part of a window a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Window,
    Header,
    Border,
    Overlay(OverlayId),
}

/// A borrowed view of any stackable element
#[derive(Debug, Clone, Copy)]
pub enum PositionableNode<'a> {
    Window { id: WindowId, bounds: Rect, z_index: i32 },
    Header { id: WindowId, node: &'a HeaderNode },
    Border { id: WindowId, node: &'a BorderNode },
    Overlay { id: WindowId, node: &'a OverlayChild },
}

impl PositionableNode<'_> {
    /// Window the node belongs to
    pub fn window_id(&self) -> WindowId {
        match self {
            PositionableNode::Window { id, .. }
            | PositionableNode::Header { id, .. }
            | PositionableNode::Border { id, .. }
            | PositionableNode::Overlay { id, .. } => *id,
        }
    }

    /// CSS-space bounds
    pub fn bounds(&self) -> Rect {
        match self {
            PositionableNode::Window { bounds, .. } => *bounds,
            PositionableNode::Header { node, .. } => node.bounds,
            PositionableNode::Border { node, .. } => node.bounds,
            PositionableNode::Overlay { node, .. } => node.bounds(),
        }
    }

    pub fn z_index(&self) -> i32 {
        match self {
            PositionableNode::Window { z_index, .. } => *z_index,
            PositionableNode::Header { node, .. } => node.z_index,
            PositionableNode::Border { node, .. } => node.z_index,
            PositionableNode::Overlay { node, .. } => node.z_index(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            PositionableNode::Window { .. } => NodeKind::Window,
            PositionableNode::Header { .. } => NodeKind::Header,
            PositionableNode::Border { .. } => NodeKind::Border,
            PositionableNode::Overlay { node, .. } => NodeKind::Overlay(node.id()),
        }
    }
}
