//! Input translation
//!
//! Turns the capture layer's key and mouse events into the native events the
//! host toolkit would have produced for the same physical input. Modifier
//! masks come from locally tracked key state; the capture layer's own
//! modifier field is unreliable on modifier key events and only consulted on
//! other keys.

use std::time::Duration;

use super::keyboard::Keyboard;
use super::keymap::{self, KeyKind, KeyMapping};
use super::native::{
    Modifiers, MouseEventId, NativeKeyEvent, NativeMouseEvent, CHAR_UNDEFINED,
};
use super::pointer::{MouseButton, Pointer};
use crate::compositor::ScalingContext;

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// A key event from the local capture layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyEvent {
    pub direction: KeyDirection,
    /// Physical key, e.g. `"KeyH"` or `"ShiftLeft"`
    pub code: String,
    /// Character the key produces with the current modifiers, or a name
    /// like `"ArrowUp"` for keys that produce none
    pub key: String,
    /// Modifiers the capture layer believes are held, if it reported any
    pub modifiers_hint: Option<Modifiers>,
    pub repeat: bool,
}

impl ClientKeyEvent {
    pub fn down(code: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            direction: KeyDirection::Down,
            code: code.into(),
            key: key.into(),
            modifiers_hint: None,
            repeat: false,
        }
    }

    pub fn up(code: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            direction: KeyDirection::Up,
            ..Self::down(code, key)
        }
    }

    pub fn with_hint(mut self, modifiers: Modifiers) -> Self {
        self.modifiers_hint = Some(modifiers);
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Pointer action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseAction {
    Down(MouseButton),
    Up(MouseButton),
    Move,
    /// Vertical scroll, positive away from the user
    Wheel { delta: f64 },
}

/// A pointer event from the local capture layer, in CSS coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientMouseEvent {
    pub action: MouseAction,
    pub x: f64,
    pub y: f64,
    /// Capture timestamp, used for multi-click detection
    pub time: Duration,
}

/// Stateful translator from client input to native events
#[derive(Debug, Default)]
pub struct InputTranslator {
    keyboard: Keyboard,
    pointer: Pointer,
    scaling: ScalingContext,
}

impl InputTranslator {
    pub fn new(scaling: ScalingContext) -> Self {
        Self {
            scaling,
            ..Self::default()
        }
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Follow a user or device scaling change
    pub fn set_scaling(&mut self, scaling: ScalingContext) {
        self.scaling = scaling;
    }

    /// Forget held keys and buttons, e.g. after focus loss
    pub fn reset(&mut self) {
        self.keyboard.reset();
        self.pointer.reset();
    }

    /// Translate a key event. Unmapped keys produce nothing.
    pub fn translate_key(&mut self, event: &ClientKeyEvent) -> Vec<NativeKeyEvent> {
        let Ok(mapping) = keymap::lookup(&event.code) else {
            return Vec::new();
        };

        match mapping.kind {
            KeyKind::Modifier(modifier) => self.modifier_key(event, mapping, modifier),
            _ => {
                if let Some(hint) = event.modifiers_hint {
                    self.keyboard.sync_with_hint(hint);
                }
                self.character_key(event, mapping)
            }
        }
    }

    fn modifier_key(&mut self, event: &ClientKeyEvent, mapping: KeyMapping, modifier: Modifiers) -> Vec<NativeKeyEvent> {
        match event.direction {
            KeyDirection::Down => {
                self.keyboard.modifier_press(&event.code, modifier);
                vec![NativeKeyEvent::pressed(
                    mapping.key_code,
                    CHAR_UNDEFINED,
                    mapping.location,
                    self.keyboard.modifiers(),
                )]
            }
            KeyDirection::Up => {
                self.keyboard.modifier_release(&event.code, modifier);
                vec![NativeKeyEvent::released(
                    mapping.key_code,
                    CHAR_UNDEFINED,
                    mapping.location,
                    self.keyboard.modifiers(),
                )]
            }
        }
    }

    fn character_key(&mut self, event: &ClientKeyEvent, mapping: KeyMapping) -> Vec<NativeKeyEvent> {
        let modifiers = self.keyboard.modifiers();

        match event.direction {
            KeyDirection::Down => {
                let key_char = key_char(mapping.kind, &event.key, modifiers);
                self.keyboard.key_press(&event.code, key_char);

                let mut events = vec![NativeKeyEvent::pressed(
                    mapping.key_code,
                    key_char,
                    mapping.location,
                    modifiers,
                )];
                if key_char != CHAR_UNDEFINED {
                    events.push(NativeKeyEvent::typed(key_char, modifiers));
                }
                events
            }
            KeyDirection::Up => {
                let key_char = match self.keyboard.key_release(&event.code) {
                    Some(pressed) => pressed.key_char,
                    None => key_char(mapping.kind, &event.key, modifiers),
                };
                vec![NativeKeyEvent::released(
                    mapping.key_code,
                    key_char,
                    mapping.location,
                    modifiers,
                )]
            }
        }
    }

    /// Translate a pointer event into host coordinates
    pub fn translate_mouse(&mut self, event: &ClientMouseEvent) -> Vec<NativeMouseEvent> {
        let x = self.scaling.css_to_host(event.x).floor() as i32;
        let y = self.scaling.css_to_host(event.y).floor() as i32;
        self.pointer.motion(x, y);
        let keys = self.keyboard.modifiers();

        let native = |id, button: u32, click_count, modifiers| NativeMouseEvent {
            id,
            x,
            y,
            button,
            click_count,
            modifiers,
            wheel_rotation: 0,
        };

        match event.action {
            MouseAction::Move => {
                let id = if self.pointer.has_button_pressed() {
                    MouseEventId::Dragged
                } else {
                    MouseEventId::Moved
                };
                vec![native(id, 0, 0, keys | self.pointer.button_mask())]
            }
            MouseAction::Down(button) => {
                let count = self.pointer.button_press(button, event.time);
                vec![native(
                    MouseEventId::Pressed,
                    button.number(),
                    count,
                    keys | self.pointer.button_mask(),
                )]
            }
            MouseAction::Up(button) => {
                let clicked = self.pointer.button_release(button);
                let modifiers = keys | self.pointer.button_mask();
                let mut events = vec![native(
                    MouseEventId::Released,
                    button.number(),
                    self.pointer.click_count(),
                    modifiers,
                )];
                if let Some(count) = clicked {
                    events.push(native(MouseEventId::Clicked, button.number(), count, modifiers));
                }
                events
            }
            MouseAction::Wheel { delta } => {
                if delta == 0.0 {
                    return Vec::new();
                }
                let mut event = native(MouseEventId::Wheel, 0, 0, keys | self.pointer.button_mask());
                event.wheel_rotation = delta.signum() as i32;
                vec![event]
            }
        }
    }
}

/// Character a key produces. Control turns letters into control characters.
fn key_char(kind: KeyKind, key: &str, modifiers: Modifiers) -> char {
    let base = match kind {
        KeyKind::Fixed(c) => c,
        KeyKind::Printable => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => CHAR_UNDEFINED,
            }
        }
        KeyKind::NonPrinting | KeyKind::Modifier(_) => CHAR_UNDEFINED,
    };

    if modifiers.contains(Modifiers::CTRL) && base.is_ascii_alphabetic() {
        char::from(base as u8 & 0x1F)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyEventId, KeyLocation};

    fn press(translator: &mut InputTranslator, code: &str, key: &str, hint: Modifiers) -> Vec<NativeKeyEvent> {
        let mut events = translator.translate_key(&ClientKeyEvent::down(code, key).with_hint(hint));
        events.extend(translator.translate_key(&ClientKeyEvent::up(code, key).with_hint(hint)));
        events
    }

    #[test]
    fn test_lowercase_letter() {
        let mut translator = InputTranslator::default();
        let events = press(&mut translator, "KeyH", "h", Modifiers::empty());

        assert_eq!(
            events,
            vec![
                NativeKeyEvent::pressed(72, 'h', KeyLocation::Standard, Modifiers::empty()),
                NativeKeyEvent::typed('h', Modifiers::empty()),
                NativeKeyEvent::released(72, 'h', KeyLocation::Standard, Modifiers::empty()),
            ]
        );
        assert_eq!(events[1].key_code, 0);
        assert_eq!(events[1].key_location, KeyLocation::Unknown);
    }

    #[test]
    fn test_whitespace_keys() {
        let mut translator = InputTranslator::default();
        for (code, key, key_code, key_char) in [
            ("Tab", "Tab", 9, '\t'),
            ("Enter", "Enter", 10, '\n'),
            ("Backspace", "Backspace", 8, '\u{8}'),
            ("Space", " ", 32, ' '),
        ] {
            let events = press(&mut translator, code, key, Modifiers::empty());
            assert_eq!(events.len(), 3, "{}", code);
            assert_eq!(events[0].key_code, key_code);
            assert_eq!(events[0].key_location, KeyLocation::Standard);
            assert!(events.iter().all(|e| e.key_char == key_char));
            assert_eq!(events[2].id, KeyEventId::Released);
        }
    }

    #[test]
    fn test_shift_letter() {
        let mut translator = InputTranslator::default();
        let mut events = Vec::new();
        // The capture layer misses Shift on its own press
        events.extend(translator.translate_key(&ClientKeyEvent::down("ShiftLeft", "Shift")));
        events.extend(press(&mut translator, "KeyH", "H", Modifiers::SHIFT));
        events.extend(translator.translate_key(
            &ClientKeyEvent::up("ShiftLeft", "Shift").with_hint(Modifiers::SHIFT),
        ));

        assert_eq!(
            events,
            vec![
                NativeKeyEvent::pressed(16, CHAR_UNDEFINED, KeyLocation::Left, Modifiers::SHIFT),
                NativeKeyEvent::pressed(72, 'H', KeyLocation::Standard, Modifiers::SHIFT),
                NativeKeyEvent::typed('H', Modifiers::SHIFT),
                NativeKeyEvent::released(72, 'H', KeyLocation::Standard, Modifiers::SHIFT),
                NativeKeyEvent::released(16, CHAR_UNDEFINED, KeyLocation::Left, Modifiers::empty()),
            ]
        );
    }

    #[test]
    fn test_control_letter() {
        let mut translator = InputTranslator::default();
        let mut events = translator.translate_key(&ClientKeyEvent::down("ControlRight", "Control"));
        events.extend(press(&mut translator, "KeyZ", "z", Modifiers::CTRL));
        events.extend(translator.translate_key(&ClientKeyEvent::up("ControlRight", "Control")));

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].key_code, 17);
        assert_eq!(events[0].key_location, KeyLocation::Right);
        assert_eq!(events[1].key_code, 90);
        assert_eq!(events[2].id, KeyEventId::Typed);
        assert_eq!(events[2].key_char, '\u{1A}');
        assert!(events[1..4].iter().all(|e| e.modifiers == Modifiers::CTRL));
        assert_eq!(events[4].modifiers, Modifiers::empty());
    }

    #[test]
    fn test_non_printing_keys() {
        let mut translator = InputTranslator::default();
        let events = press(&mut translator, "ArrowLeft", "ArrowLeft", Modifiers::empty());

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, KeyEventId::Pressed);
        assert_eq!(events[0].key_code, 37);
        assert_eq!(events[1].id, KeyEventId::Released);
        assert!(events.iter().all(|e| e.key_char == CHAR_UNDEFINED));
    }

    #[test]
    fn test_escape_and_delete_type() {
        let mut translator = InputTranslator::default();
        let escape = press(&mut translator, "Escape", "Escape", Modifiers::empty());
        assert_eq!(escape[1], NativeKeyEvent::typed('\u{1B}', Modifiers::empty()));

        let delete = press(&mut translator, "Delete", "Delete", Modifiers::empty());
        assert_eq!(delete[1].key_char, '\u{7F}');
    }

    #[test]
    fn test_release_repeats_pressed_char() {
        let mut translator = InputTranslator::default();
        translator.translate_key(&ClientKeyEvent::down("ShiftLeft", "Shift"));
        translator.translate_key(&ClientKeyEvent::down("KeyA", "A").with_hint(Modifiers::SHIFT));
        translator.translate_key(&ClientKeyEvent::up("ShiftLeft", "Shift"));

        let events = translator.translate_key(&ClientKeyEvent::up("KeyA", "a"));
        assert_eq!(events[0].key_char, 'A');
        assert_eq!(events[0].modifiers, Modifiers::empty());
    }

    #[test]
    fn test_hint_resyncs_missed_release() {
        let mut translator = InputTranslator::default();
        translator.translate_key(&ClientKeyEvent::down("AltLeft", "Alt"));
        // Alt went up while another application had focus
        let events = press(&mut translator, "KeyX", "x", Modifiers::empty());

        assert!(events.iter().all(|e| e.modifiers.is_empty()));
        assert!(translator.keyboard().modifiers().is_empty());
    }

    #[test]
    fn test_missing_hint_keeps_held_shift() {
        let mut translator = InputTranslator::default();
        translator.translate_key(&ClientKeyEvent::down("ShiftLeft", "Shift"));

        let events = translator.translate_key(&ClientKeyEvent::down("KeyH", "H"));
        assert_eq!(
            events,
            vec![
                NativeKeyEvent::pressed(72, 'H', KeyLocation::Standard, Modifiers::SHIFT),
                NativeKeyEvent::typed('H', Modifiers::SHIFT),
            ]
        );

        let released = translator.translate_key(&ClientKeyEvent::up("KeyH", "H"));
        assert_eq!(released[0].modifiers, Modifiers::SHIFT);
        assert_eq!(translator.keyboard().modifiers(), Modifiers::SHIFT);
    }

    #[test]
    fn test_repeat_types_again() {
        let mut translator = InputTranslator::default();
        translator.translate_key(&ClientKeyEvent::down("KeyK", "k"));
        let events = translator.translate_key(&ClientKeyEvent::down("KeyK", "k").with_repeat(true));

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].key_char, 'k');
    }

    #[test]
    fn test_unmapped_key_dropped() {
        let mut translator = InputTranslator::default();
        assert!(translator
            .translate_key(&ClientKeyEvent::down("BrowserBack", "BrowserBack"))
            .is_empty());
    }

    #[test]
    fn test_numpad_location() {
        let mut translator = InputTranslator::default();
        let events = press(&mut translator, "Numpad4", "4", Modifiers::empty());
        assert_eq!(events[0].key_code, 100);
        assert_eq!(events[0].key_location, KeyLocation::Numpad);
        assert_eq!(events[1].key_char, '4');
    }

    fn mouse(action: MouseAction, x: f64, y: f64, millis: u64) -> ClientMouseEvent {
        ClientMouseEvent {
            action,
            x,
            y,
            time: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_click_in_host_coordinates() {
        let mut translator = InputTranslator::new(ScalingContext::new(2.0, 1.0));

        let pressed = translator.translate_mouse(&mouse(MouseAction::Down(MouseButton::Primary), 101.0, 50.0, 0));
        assert_eq!(pressed.len(), 1);
        assert_eq!(pressed[0].id, MouseEventId::Pressed);
        assert_eq!((pressed[0].x, pressed[0].y), (50, 25));
        assert_eq!(pressed[0].button, 1);
        assert_eq!(pressed[0].modifiers, Modifiers::BUTTON1);

        let released = translator.translate_mouse(&mouse(MouseAction::Up(MouseButton::Primary), 101.0, 50.0, 80));
        assert_eq!(released.len(), 2);
        assert_eq!(released[0].id, MouseEventId::Released);
        assert_eq!(released[0].modifiers, Modifiers::empty());
        assert_eq!(released[1].id, MouseEventId::Clicked);
        assert_eq!(released[1].click_count, 1);
    }

    #[test]
    fn test_drag_and_move() {
        let mut translator = InputTranslator::default();
        let moved = translator.translate_mouse(&mouse(MouseAction::Move, 5.0, 5.0, 0));
        assert_eq!(moved[0].id, MouseEventId::Moved);

        translator.translate_mouse(&mouse(MouseAction::Down(MouseButton::Secondary), 5.0, 5.0, 10));
        let dragged = translator.translate_mouse(&mouse(MouseAction::Move, 50.0, 5.0, 20));
        assert_eq!(dragged[0].id, MouseEventId::Dragged);
        assert_eq!(dragged[0].modifiers, Modifiers::BUTTON3);

        let released = translator.translate_mouse(&mouse(MouseAction::Up(MouseButton::Secondary), 50.0, 5.0, 30));
        assert_eq!(released.len(), 1);
    }

    #[test]
    fn test_mouse_carries_key_modifiers() {
        let mut translator = InputTranslator::default();
        translator.translate_key(&ClientKeyEvent::down("ShiftLeft", "Shift"));

        let events = translator.translate_mouse(&mouse(MouseAction::Down(MouseButton::Primary), 0.0, 0.0, 0));
        assert_eq!(events[0].modifiers, Modifiers::SHIFT | Modifiers::BUTTON1);

        let wheel = translator.translate_mouse(&mouse(MouseAction::Wheel { delta: -3.0 }, 0.0, 0.0, 5));
        assert_eq!(wheel[0].id, MouseEventId::Wheel);
        assert_eq!(wheel[0].wheel_rotation, -1);
    }
}
