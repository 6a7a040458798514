//! Pointer (mouse/trackpad) state

use std::time::Duration;

use log::debug;

use super::native::Modifiers;

/// Presses closer together than this count as one multi-click
pub const MULTI_CLICK_INTERVAL: Duration = Duration::from_millis(500);

/// Maximum drift, in host units, between press and release for a click
pub const CLICK_TOLERANCE: i32 = 4;

/// Mouse buttons the host knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

impl MouseButton {
    /// Host button number
    pub fn number(self) -> u32 {
        match self {
            MouseButton::Primary => 1,
            MouseButton::Middle => 2,
            MouseButton::Secondary => 3,
        }
    }

    pub fn mask(self) -> Modifiers {
        match self {
            MouseButton::Primary => Modifiers::BUTTON1,
            MouseButton::Middle => Modifiers::BUTTON2,
            MouseButton::Secondary => Modifiers::BUTTON3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LastPress {
    button: MouseButton,
    time: Duration,
    position: (i32, i32),
    count: u32,
}

/// Pointer state
#[derive(Debug, Default)]
pub struct Pointer {
    /// Position in host coordinates
    position: (i32, i32),
    /// Currently pressed buttons
    pressed_buttons: Vec<MouseButton>,
    last_press: Option<LastPress>,
    /// Set once the pointer strays too far from the last press
    moved_since_press: bool,
}

impl Pointer {
    /// Create a new pointer
    pub fn new() -> Self {
        Self::default()
    }

    /// Update pointer position
    pub fn motion(&mut self, x: i32, y: i32) {
        self.position = (x, y);
        if let Some(press) = &self.last_press {
            let (px, py) = press.position;
            if (x - px).abs() > CLICK_TOLERANCE || (y - py).abs() > CLICK_TOLERANCE {
                self.moved_since_press = true;
            }
        }
    }

    /// Get current position
    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Handle a button press at `time`, returning the click count
    pub fn button_press(&mut self, button: MouseButton, time: Duration) -> u32 {
        if !self.pressed_buttons.contains(&button) {
            self.pressed_buttons.push(button);
        }

        let count = match self.last_press {
            Some(last)
                if last.button == button
                    && !self.moved_since_press
                    && time.saturating_sub(last.time) <= MULTI_CLICK_INTERVAL =>
            {
                last.count + 1
            }
            _ => 1,
        };
        self.last_press = Some(LastPress {
            button,
            time,
            position: self.position,
            count,
        });
        self.moved_since_press = false;
        debug!("Button pressed: {:?}, click count {}", button, count);
        count
    }

    /// Handle a button release. Returns the click count if the release
    /// completes a click.
    pub fn button_release(&mut self, button: MouseButton) -> Option<u32> {
        let idx = self.pressed_buttons.iter().position(|&b| b == button)?;
        self.pressed_buttons.remove(idx);
        debug!("Button released: {:?}", button);

        match self.last_press {
            Some(last) if last.button == button && !self.moved_since_press => Some(last.count),
            _ => None,
        }
    }

    /// Click count of the most recent press
    pub fn click_count(&self) -> u32 {
        self.last_press.map_or(0, |last| last.count)
    }

    /// Get currently pressed buttons
    pub fn pressed_buttons(&self) -> &[MouseButton] {
        &self.pressed_buttons
    }

    /// Check if any button is pressed
    pub fn has_button_pressed(&self) -> bool {
        !self.pressed_buttons.is_empty()
    }

    /// Button mask of every pressed button
    pub fn button_mask(&self) -> Modifiers {
        self.pressed_buttons
            .iter()
            .fold(Modifiers::empty(), |mask, button| mask | button.mask())
    }

    pub fn reset(&mut self) {
        self.pressed_buttons.clear();
        self.last_press = None;
        self.moved_since_press = false;
    }
}
