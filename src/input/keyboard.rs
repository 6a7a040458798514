//! Keyboard state tracking

use log::debug;

use super::native::Modifiers;

/// Held modifier: the physical key holding it, or none when it was only
/// learned from a capture hint
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeldModifier {
    code: Option<String>,
    modifier: Modifiers,
}

/// A key that is currently down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressedKey {
    pub code: String,
    /// Character reported on press, repeated on release
    pub key_char: char,
}

/// Keyboard state
#[derive(Debug, Default)]
pub struct Keyboard {
    /// Currently pressed non-modifier keys
    pressed_keys: Vec<PressedKey>,
    /// Modifiers in the order they went down
    held: Vec<HeldModifier>,
}

impl Keyboard {
    /// Create a new keyboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifier mask of every held modifier
    pub fn modifiers(&self) -> Modifiers {
        self.held
            .iter()
            .fold(Modifiers::empty(), |mask, held| mask | held.modifier)
    }

    /// Handle a modifier key press. Returns false on auto-repeat.
    pub fn modifier_press(&mut self, code: &str, modifier: Modifiers) -> bool {
        if self.held.iter().any(|h| h.code.as_deref() == Some(code)) {
            return false;
        }
        // A real key replaces what a hint guessed
        self.held
            .retain(|h| h.code.is_some() || h.modifier != modifier);
        self.held.push(HeldModifier {
            code: Some(code.to_string()),
            modifier,
        });
        debug!("Modifier pressed: {} ({:?})", code, modifier);
        true
    }

    /// Handle a modifier key release. The modifier stays held if the other
    /// physical variant is still down.
    pub fn modifier_release(&mut self, code: &str, modifier: Modifiers) -> bool {
        let before = self.held.len();
        self.held
            .retain(|h| h.code.as_deref() != Some(code) && !(h.code.is_none() && h.modifier == modifier));
        debug!("Modifier released: {} ({:?})", code, modifier);
        self.held.len() != before
    }

    /// Bring the tracked modifiers in line with a capture hint: modifiers the
    /// hint lacks are dropped, modifiers only the hint knows are added
    pub fn sync_with_hint(&mut self, hint: Modifiers) {
        let hint = hint & Modifiers::KEYS;
        let tracked = self.modifiers();
        if tracked == hint {
            return;
        }

        debug!("Resyncing modifiers: tracked {:?}, hint {:?}", tracked, hint);
        self.held.retain(|h| hint.contains(h.modifier));
        for modifier in (hint - tracked).iter() {
            self.held.push(HeldModifier {
                code: None,
                modifier,
            });
        }
    }

    /// Handle a key press. Returns false if the key is already down (repeat).
    pub fn key_press(&mut self, code: &str, key_char: char) -> bool {
        if self.pressed(code).is_some() {
            return false;
        }
        self.pressed_keys.push(PressedKey {
            code: code.to_string(),
            key_char,
        });
        debug!("Key pressed: {}", code);
        true
    }

    /// Handle a key release, returning the key as it was pressed
    pub fn key_release(&mut self, code: &str) -> Option<PressedKey> {
        let idx = self.pressed_keys.iter().position(|k| k.code == code)?;
        debug!("Key released: {}", code);
        Some(self.pressed_keys.remove(idx))
    }

    pub fn pressed(&self, code: &str) -> Option<&PressedKey> {
        self.pressed_keys.iter().find(|k| k.code == code)
    }

    /// Get currently pressed keys
    pub fn pressed_keys(&self) -> &[PressedKey] {
        &self.pressed_keys
    }

    /// Forget everything, e.g. when the client loses focus
    pub fn reset(&mut self) {
        self.pressed_keys.clear();
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_new() {
        let keyboard = Keyboard::new();
        assert!(keyboard.modifiers().is_empty());
        assert!(keyboard.pressed_keys().is_empty());
    }

    #[test]
    fn test_key_press_release() {
        let mut keyboard = Keyboard::new();

        assert!(keyboard.key_press("KeyA", 'a'));
        // Repeat
        assert!(!keyboard.key_press("KeyA", 'a'));

        let key = keyboard.key_release("KeyA").unwrap();
        assert_eq!(key.key_char, 'a');
        assert!(keyboard.key_release("KeyA").is_none());
    }

    #[test]
    fn test_both_shift_keys() {
        let mut keyboard = Keyboard::new();
        keyboard.modifier_press("ShiftLeft", Modifiers::SHIFT);
        keyboard.modifier_press("ShiftRight", Modifiers::SHIFT);

        keyboard.modifier_release("ShiftLeft", Modifiers::SHIFT);
        assert_eq!(keyboard.modifiers(), Modifiers::SHIFT);

        keyboard.modifier_release("ShiftRight", Modifiers::SHIFT);
        assert!(keyboard.modifiers().is_empty());
    }

    #[test]
    fn test_sync_with_hint() {
        let mut keyboard = Keyboard::new();
        keyboard.modifier_press("ControlLeft", Modifiers::CTRL);

        // Control release was missed, Shift press was missed
        keyboard.sync_with_hint(Modifiers::SHIFT);
        assert_eq!(keyboard.modifiers(), Modifiers::SHIFT);

        // Releasing any Shift key clears the hinted entry
        assert!(keyboard.modifier_release("ShiftLeft", Modifiers::SHIFT));
        assert!(keyboard.modifiers().is_empty());
    }

    #[test]
    fn test_real_press_replaces_hint() {
        let mut keyboard = Keyboard::new();
        keyboard.sync_with_hint(Modifiers::ALT);
        assert!(keyboard.modifier_press("AltLeft", Modifiers::ALT));
        keyboard.modifier_release("AltLeft", Modifiers::ALT);
        assert!(keyboard.modifiers().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut keyboard = Keyboard::new();
        keyboard.modifier_press("MetaLeft", Modifiers::META);
        keyboard.key_press("KeyQ", 'q');
        keyboard.reset();

        assert!(keyboard.modifiers().is_empty());
        assert!(keyboard.pressed("KeyQ").is_none());
    }
}
