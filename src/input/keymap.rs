//! Physical key table
//!
//! Maps the capture layer's physical key codes (`"KeyA"`, `"ShiftLeft"`,
//! `"NumpadEnter"`, ...) to the host's virtual key codes and locations.

use log::warn;

use super::native::{KeyLocation, Modifiers};
use super::InputError;

pub const VK_BACK_SPACE: u32 = 8;
pub const VK_TAB: u32 = 9;
pub const VK_ENTER: u32 = 10;
pub const VK_SHIFT: u32 = 16;
pub const VK_CONTROL: u32 = 17;
pub const VK_ALT: u32 = 18;
pub const VK_CAPS_LOCK: u32 = 20;
pub const VK_ESCAPE: u32 = 27;
pub const VK_SPACE: u32 = 32;
pub const VK_PAGE_UP: u32 = 33;
pub const VK_PAGE_DOWN: u32 = 34;
pub const VK_END: u32 = 35;
pub const VK_HOME: u32 = 36;
pub const VK_LEFT: u32 = 37;
pub const VK_UP: u32 = 38;
pub const VK_RIGHT: u32 = 39;
pub const VK_DOWN: u32 = 40;
pub const VK_COMMA: u32 = 44;
pub const VK_MINUS: u32 = 45;
pub const VK_PERIOD: u32 = 46;
pub const VK_SLASH: u32 = 47;
pub const VK_0: u32 = 48;
pub const VK_SEMICOLON: u32 = 59;
pub const VK_EQUALS: u32 = 61;
pub const VK_A: u32 = 65;
pub const VK_OPEN_BRACKET: u32 = 91;
pub const VK_BACK_SLASH: u32 = 92;
pub const VK_CLOSE_BRACKET: u32 = 93;
pub const VK_NUMPAD0: u32 = 96;
pub const VK_MULTIPLY: u32 = 106;
pub const VK_ADD: u32 = 107;
pub const VK_SUBTRACT: u32 = 109;
pub const VK_DECIMAL: u32 = 110;
pub const VK_DIVIDE: u32 = 111;
pub const VK_F1: u32 = 112;
pub const VK_DELETE: u32 = 127;
pub const VK_INSERT: u32 = 155;
pub const VK_META: u32 = 157;
pub const VK_BACK_QUOTE: u32 = 192;
pub const VK_QUOTE: u32 = 222;

/// How a key produces characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Shift, Control, Alt, Meta
    Modifier(Modifiers),
    /// Always types this character, whatever the capture layer says
    Fixed(char),
    /// Types the character the capture layer reports for it
    Printable,
    /// Never types: arrows, function keys, navigation
    NonPrinting,
}

/// Host view of a physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping {
    pub key_code: u32,
    pub location: KeyLocation,
    pub kind: KeyKind,
}

impl KeyMapping {
    const fn new(key_code: u32, location: KeyLocation, kind: KeyKind) -> Self {
        Self {
            key_code,
            location,
            kind,
        }
    }

    const fn printable(key_code: u32) -> Self {
        Self::new(key_code, KeyLocation::Standard, KeyKind::Printable)
    }

    const fn fixed(key_code: u32, key_char: char) -> Self {
        Self::new(key_code, KeyLocation::Standard, KeyKind::Fixed(key_char))
    }

    const fn non_printing(key_code: u32) -> Self {
        Self::new(key_code, KeyLocation::Standard, KeyKind::NonPrinting)
    }

    const fn modifier(key_code: u32, location: KeyLocation, modifier: Modifiers) -> Self {
        Self::new(key_code, location, KeyKind::Modifier(modifier))
    }

    const fn numpad(key_code: u32) -> Self {
        Self::new(key_code, KeyLocation::Numpad, KeyKind::Printable)
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self.kind, KeyKind::Modifier(_))
    }
}

/// Look up a physical key code
pub fn lookup(code: &str) -> Result<KeyMapping, InputError> {
    match_code(code).ok_or_else(|| {
        warn!("Dropping unmapped key {:?}", code);
        InputError::UnmappedKey(code.to_string())
    })
}

fn match_code(code: &str) -> Option<KeyMapping> {
    if let Some(letter) = single_char(code.strip_prefix("Key")) {
        return letter
            .is_ascii_uppercase()
            .then(|| KeyMapping::printable(VK_A + (letter as u32 - 'A' as u32)));
    }
    if let Some(digit) = single_char(code.strip_prefix("Digit")).and_then(|c| c.to_digit(10)) {
        return Some(KeyMapping::printable(VK_0 + digit));
    }
    if let Some(digit) = single_char(code.strip_prefix("Numpad")).and_then(|c| c.to_digit(10)) {
        return Some(KeyMapping::numpad(VK_NUMPAD0 + digit));
    }
    if let Some(n) = code.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=12)
            .contains(&n)
            .then(|| KeyMapping::non_printing(VK_F1 + n - 1));
    }

    let mapping = match code {
        "ShiftLeft" => KeyMapping::modifier(VK_SHIFT, KeyLocation::Left, Modifiers::SHIFT),
        "ShiftRight" => KeyMapping::modifier(VK_SHIFT, KeyLocation::Right, Modifiers::SHIFT),
        "ControlLeft" => KeyMapping::modifier(VK_CONTROL, KeyLocation::Left, Modifiers::CTRL),
        "ControlRight" => KeyMapping::modifier(VK_CONTROL, KeyLocation::Right, Modifiers::CTRL),
        "AltLeft" => KeyMapping::modifier(VK_ALT, KeyLocation::Left, Modifiers::ALT),
        "AltRight" => KeyMapping::modifier(VK_ALT, KeyLocation::Right, Modifiers::ALT),
        "MetaLeft" => KeyMapping::modifier(VK_META, KeyLocation::Left, Modifiers::META),
        "MetaRight" => KeyMapping::modifier(VK_META, KeyLocation::Right, Modifiers::META),

        "Tab" => KeyMapping::fixed(VK_TAB, '\t'),
        "Enter" => KeyMapping::fixed(VK_ENTER, '\n'),
        "Backspace" => KeyMapping::fixed(VK_BACK_SPACE, '\u{8}'),
        "Space" => KeyMapping::fixed(VK_SPACE, ' '),
        "Escape" => KeyMapping::fixed(VK_ESCAPE, '\u{1B}'),
        "Delete" => KeyMapping::fixed(VK_DELETE, '\u{7F}'),

        "Minus" => KeyMapping::printable(VK_MINUS),
        "Equal" => KeyMapping::printable(VK_EQUALS),
        "Comma" => KeyMapping::printable(VK_COMMA),
        "Period" => KeyMapping::printable(VK_PERIOD),
        "Slash" => KeyMapping::printable(VK_SLASH),
        "Semicolon" => KeyMapping::printable(VK_SEMICOLON),
        "Quote" => KeyMapping::printable(VK_QUOTE),
        "BracketLeft" => KeyMapping::printable(VK_OPEN_BRACKET),
        "BracketRight" => KeyMapping::printable(VK_CLOSE_BRACKET),
        "Backslash" => KeyMapping::printable(VK_BACK_SLASH),
        "Backquote" => KeyMapping::printable(VK_BACK_QUOTE),

        "NumpadEnter" => KeyMapping::new(VK_ENTER, KeyLocation::Numpad, KeyKind::Fixed('\n')),
        "NumpadAdd" => KeyMapping::numpad(VK_ADD),
        "NumpadSubtract" => KeyMapping::numpad(VK_SUBTRACT),
        "NumpadMultiply" => KeyMapping::numpad(VK_MULTIPLY),
        "NumpadDivide" => KeyMapping::numpad(VK_DIVIDE),
        "NumpadDecimal" => KeyMapping::numpad(VK_DECIMAL),

        "ArrowLeft" => KeyMapping::non_printing(VK_LEFT),
        "ArrowUp" => KeyMapping::non_printing(VK_UP),
        "ArrowRight" => KeyMapping::non_printing(VK_RIGHT),
        "ArrowDown" => KeyMapping::non_printing(VK_DOWN),
        "Home" => KeyMapping::non_printing(VK_HOME),
        "End" => KeyMapping::non_printing(VK_END),
        "PageUp" => KeyMapping::non_printing(VK_PAGE_UP),
        "PageDown" => KeyMapping::non_printing(VK_PAGE_DOWN),
        "Insert" => KeyMapping::non_printing(VK_INSERT),
        "CapsLock" => KeyMapping::non_printing(VK_CAPS_LOCK),
        _ => return None,
    };
    Some(mapping)
}

fn single_char(s: Option<&str>) -> Option<char> {
    let mut chars = s?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
