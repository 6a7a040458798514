//! Native input event records
//!
//! The host expects AWT-shaped events, so ids, locations and modifier bits
//! use the host toolkit's numeric values.

use bitflags::bitflags;

/// The host toolkit's "no character" sentinel
pub const CHAR_UNDEFINED: char = '\u{FFFF}';

bitflags! {
    /// Extended modifier mask, as held at the moment of an event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 6;
        const CTRL = 1 << 7;
        const META = 1 << 8;
        const ALT = 1 << 9;
        const BUTTON1 = 1 << 10;
        const BUTTON2 = 1 << 11;
        const BUTTON3 = 1 << 12;
        const ALT_GRAPH = 1 << 13;
    }
}

impl Modifiers {
    /// Keyboard modifiers only
    pub const KEYS: Modifiers = Modifiers::SHIFT
        .union(Modifiers::CTRL)
        .union(Modifiers::META)
        .union(Modifiers::ALT)
        .union(Modifiers::ALT_GRAPH);

    /// Mouse buttons only
    pub const BUTTONS: Modifiers = Modifiers::BUTTON1
        .union(Modifiers::BUTTON2)
        .union(Modifiers::BUTTON3);
}

/// Key event id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventId {
    Typed,
    Pressed,
    Released,
}

impl KeyEventId {
    pub fn code(self) -> u32 {
        match self {
            KeyEventId::Typed => 400,
            KeyEventId::Pressed => 401,
            KeyEventId::Released => 402,
        }
    }
}

/// Which physical variant of a key produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLocation {
    #[default]
    Unknown,
    Standard,
    Left,
    Right,
    Numpad,
}

impl KeyLocation {
    pub fn code(self) -> u32 {
        match self {
            KeyLocation::Unknown => 0,
            KeyLocation::Standard => 1,
            KeyLocation::Left => 2,
            KeyLocation::Right => 3,
            KeyLocation::Numpad => 4,
        }
    }
}

/// A key event in the host's native shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeKeyEvent {
    pub id: KeyEventId,
    /// Virtual key code, 0 for typed events
    pub key_code: u32,
    pub key_char: char,
    pub key_location: KeyLocation,
    pub modifiers: Modifiers,
}

impl NativeKeyEvent {
    pub fn pressed(key_code: u32, key_char: char, key_location: KeyLocation, modifiers: Modifiers) -> Self {
        Self {
            id: KeyEventId::Pressed,
            key_code,
            key_char,
            key_location,
            modifiers,
        }
    }

    pub fn typed(key_char: char, modifiers: Modifiers) -> Self {
        Self {
            id: KeyEventId::Typed,
            key_code: 0,
            key_char,
            key_location: KeyLocation::Unknown,
            modifiers,
        }
    }

    pub fn released(key_code: u32, key_char: char, key_location: KeyLocation, modifiers: Modifiers) -> Self {
        Self {
            id: KeyEventId::Released,
            key_code,
            key_char,
            key_location,
            modifiers,
        }
    }
}

/// Mouse event id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventId {
    Clicked,
    Pressed,
    Released,
    Moved,
    Dragged,
    Wheel,
}

impl MouseEventId {
    pub fn code(self) -> u32 {
        match self {
            MouseEventId::Clicked => 500,
            MouseEventId::Pressed => 501,
            MouseEventId::Released => 502,
            MouseEventId::Moved => 503,
            MouseEventId::Dragged => 506,
            MouseEventId::Wheel => 507,
        }
    }
}

/// A mouse event in the host's native shape, in host logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeMouseEvent {
    pub id: MouseEventId,
    pub x: i32,
    pub y: i32,
    /// 0 for no button, otherwise 1 to 3
    pub button: u32,
    pub click_count: u32,
    pub modifiers: Modifiers,
    /// Wheel notches, positive away from the user. Zero except for wheel events.
    pub wheel_rotation: i32,
}
