//! Input handling module
//!
//! This module translates local keyboard and pointer input into the host's
//! native event records, tracking held keys and buttons along the way.

pub mod keyboard;
pub mod keymap;
pub mod native;
pub mod pointer;
pub mod translator;

pub use keyboard::{Keyboard, PressedKey};
pub use keymap::{KeyKind, KeyMapping};
pub use native::{
    KeyEventId, KeyLocation, Modifiers, MouseEventId, NativeKeyEvent, NativeMouseEvent,
    CHAR_UNDEFINED,
};
pub use pointer::{MouseButton, Pointer};
pub use translator::{
    ClientKeyEvent, ClientMouseEvent, InputTranslator, KeyDirection, MouseAction,
};

/// Input errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The capture layer sent a physical key with no host equivalent
    #[error("Unmapped key code {0:?}")]
    UnmappedKey(String),
}
