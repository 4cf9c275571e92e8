//! The input state of the chip and the traits the outside world has to
//! implement to present it.
use std::time::Duration;

use crate::{definitions::keyboard, display::Framebuffer};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will display the given framebuffer
    fn display(&mut self, framebuffer: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the host keyboard
pub trait KeyboardCommands {
    /// Is the given key (`0x0-0xF`) currently held down
    fn pressed(&self, key: usize) -> bool;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for making noise
pub trait SoundCommands: Send {
    /// Will play a tone for the given duration
    fn play(&mut self, duration: Duration);
    /// Will stop any tone
    fn stop(&mut self);
}

/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Will set the value of the given key, returns true if the key went down.
    pub fn set_key(&mut self, key: usize, to: bool) -> bool {
        match self.keys.get_mut(key) {
            Some(state) => {
                let pressed = to && !*state;
                *state = to;
                pressed
            }
            None => {
                log::warn!("Ignoring key {:#X} outside of the hex pad", key);
                false
            }
        }
    }

    /// Will overwrite all keys, returns true if any key went down.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) -> bool {
        let pressed = self
            .keys
            .iter()
            .zip(keys.iter())
            .any(|(&old, &new)| new && !old);
        self.keys = *keys;
        pressed
    }

    /// Will copy the state out of the given keyboard provider
    pub fn refresh<K: KeyboardCommands + ?Sized>(&mut self, provider: &K) -> bool {
        let mut keys = [false; keyboard::SIZE];
        for (index, key) in keys.iter_mut().enumerate() {
            *key = provider.pressed(index);
        }
        self.set_mult(&keys)
    }

    /// Is the given key pressed, keys outside of the pad never are.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// The lowest key that is currently pressed
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&key| key)
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_key() {
        let mut keyboard = Keyboard::new();
        assert!(keyboard.set_key(0x5, true));
        // holding does not count as a new press
        assert!(!keyboard.set_key(0x5, true));
        assert!(keyboard.is_pressed(0x5));
        assert!(!keyboard.set_key(0x5, false));
        assert!(!keyboard.is_pressed(0x5));
        assert!(!keyboard.is_pressed(0x42));
    }

    #[test]
    fn test_first_pressed() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.first_pressed(), None);
        let mut keys = [false; keyboard::SIZE];
        keys[0xC] = true;
        keys[0x3] = true;
        assert!(keyboard.set_mult(&keys));
        assert_eq!(keyboard.first_pressed(), Some(0x3));
        assert!(!keyboard.set_mult(&keys));
    }

    #[test]
    fn test_refresh_from_provider() {
        let mut provider = MockKeyboardCommands::new();
        provider
            .expect_pressed()
            .times(keyboard::SIZE)
            .returning(|key| key == 0xA);

        let mut keyboard = Keyboard::new();
        assert!(keyboard.refresh(&provider));
        assert_eq!(keyboard.first_pressed(), Some(0xA));
        assert_eq!(keyboard.get_keys().iter().filter(|k| **k).count(), 1);
    }
}
