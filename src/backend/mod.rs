//! Backend module
//!
//! This module drives the client: a calloop-based frame loop that ticks
//! the compositor at a fixed rate.

pub mod event_loop;

pub use event_loop::{FrameDriven, FrameLoop};
