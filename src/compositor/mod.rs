//! Window compositor module
//!
//! This module contains the client-side window model:
//! - Geometry and the host/CSS/device scaling rules
//! - Windows with their decorations and overlay children
//! - Stacking, hit testing and composition onto the screen
//! - Pointer grabs that turn into move/resize requests for the host

pub mod geometry;
pub mod interaction;
pub mod node;
pub mod state;
pub mod window;

pub use geometry::{LayoutContext, PixelRect, Rect, ScalingContext};
pub use interaction::{Grab, GrabKind, ResizeEdge, WindowIntent};
pub use node::{BorderNode, HeaderNode, NodeKind, OverlayChild, OverlayId, PositionableNode};
pub use state::{CompositorError, FrameSummary, HitTarget, HostEvent, WindowCompositor};
pub use window::{
    Window, WindowDescriptor, WindowId, WindowKind, WindowLifecycle, WindowUpdate, WINDOW_Z_STEP,
};
