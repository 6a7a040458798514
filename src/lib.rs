//! Remotia - a thin client for remoted desktop GUIs
//!
//! A host application streams window-lifecycle events and draw commands.
//! Remotia rebuilds the window layout locally, replays the draw commands
//! into per-window surfaces and translates local input back into the host
//! toolkit's native event shape.
//!
//! # Architecture
//!
//! - **Renderer**: rendering surfaces, draw commands and the per-window
//!   pending/incoming draw queue
//! - **Compositor**: windows, decorations and overlays, z-order, scaling
//!   between host, CSS and device pixels
//! - **Input**: key and mouse translation with held-modifier tracking
//! - **Backend**: calloop frame loop driving everything once per frame
//!
//! # Example
//!
//! ```
//! use remotia::compositor::{Rect, WindowCompositor, WindowDescriptor, WindowId};
//! use remotia::config::ClientConfig;
//! use remotia::renderer::PaintCommand;
//!
//! let mut compositor: WindowCompositor = WindowCompositor::new(ClientConfig::default());
//! let id = compositor.create_window(WindowDescriptor::new(WindowId(1), Rect::new(0.0, 0.0, 64.0, 32.0)));
//! compositor
//!     .enqueue_draw(id, [PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 8.0, 8.0), color: 0xFFFF_FFFF }])
//!     .unwrap();
//! assert_eq!(compositor.render_frame().applied, 1);
//! ```

pub mod backend;
pub mod compositor;
pub mod config;
pub mod input;
pub mod renderer;
