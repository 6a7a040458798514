//! Window interaction
//!
//! Moving and resizing happen on the host. The client only tracks the
//! pointer grab and turns pointer motion into logical deltas for the host;
//! the window moves once the host reports its new bounds.

use super::geometry::{Rect, ScalingContext};
use super::window::WindowId;

/// Requests sent to the host on behalf of the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowIntent {
    /// Move by a delta in host logical units
    Move { id: WindowId, dx: f64, dy: f64 },
    /// Drag `edge` by a delta in host logical units
    Resize {
        id: WindowId,
        edge: ResizeEdge,
        dx: f64,
        dy: f64,
    },
    /// The user asked to close the window
    Close { id: WindowId },
    /// Bring the window to front and give it focus
    Activate { id: WindowId },
}

impl WindowIntent {
    pub fn window_id(&self) -> WindowId {
        match self {
            WindowIntent::Move { id, .. }
            | WindowIntent::Resize { id, .. }
            | WindowIntent::Close { id }
            | WindowIntent::Activate { id } => *id,
        }
    }
}

/// Resize edge for resize grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    /// Which edge of `frame` a point outside of it (on the border) grabs
    pub fn from_point(frame: Rect, x: f64, y: f64) -> Option<Self> {
        let left = x < frame.x;
        let right = x >= frame.right();
        let top = y < frame.y;
        let bottom = y >= frame.bottom();

        match (top, bottom, left, right) {
            (true, _, true, _) => Some(ResizeEdge::TopLeft),
            (true, _, _, true) => Some(ResizeEdge::TopRight),
            (_, true, true, _) => Some(ResizeEdge::BottomLeft),
            (_, true, _, true) => Some(ResizeEdge::BottomRight),
            (true, _, _, _) => Some(ResizeEdge::Top),
            (_, true, _, _) => Some(ResizeEdge::Bottom),
            (_, _, true, _) => Some(ResizeEdge::Left),
            (_, _, _, true) => Some(ResizeEdge::Right),
            _ => None,
        }
    }
}

/// Type of pointer grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabKind {
    Move,
    Resize(ResizeEdge),
}

/// An active pointer grab on a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub window: WindowId,
    pub kind: GrabKind,
    /// Last pointer position in CSS space
    last: (f64, f64),
}

impl Grab {
    /// Start a grab at a CSS-space pointer position
    pub fn new(window: WindowId, kind: GrabKind, x: f64, y: f64) -> Self {
        Self {
            window,
            kind,
            last: (x, y),
        }
    }

    /// Follow the pointer, producing the host-space delta since the last
    /// position. Returns None if the pointer did not move.
    pub fn drag_to(&mut self, x: f64, y: f64, scaling: &ScalingContext) -> Option<WindowIntent> {
        let (dx, dy) = (x - self.last.0, y - self.last.1);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.last = (x, y);

        let dx = scaling.css_to_host(dx);
        let dy = scaling.css_to_host(dy);
        Some(match self.kind {
            GrabKind::Move => WindowIntent::Move {
                id: self.window,
                dx,
                dy,
            },
            GrabKind::Resize(edge) => WindowIntent::Resize {
                id: self.window,
                edge,
                dx,
                dy,
            },
        })
    }
}
