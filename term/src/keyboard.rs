//! Terminals only report key presses, never releases, so a key counts as
//! held for a few frames after its last press event.
use chip::{definitions::keyboard, devices::KeyboardCommands};
use hashbrown::HashMap;
use once_cell::sync::Lazy;

/// The left hand side of a qwerty keyboard, laid out like the hex pad
const HOST_LAYOUT: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

/// Maps a host key onto the hex pad.
pub fn map_key(key: char) -> Option<usize> {
    /// maps the external keyboard layout to the internaly given.
    static LAYOUT_MAP: Lazy<HashMap<char, usize>> = Lazy::new(|| {
        HOST_LAYOUT
            .iter()
            .flatten()
            .zip(keyboard::LAYOUT.iter().flatten())
            .map(|(&host, &pad)| (host, pad))
            .collect()
    });

    LAYOUT_MAP.get(&key.to_ascii_lowercase()).copied()
}

/// The keys that were pressed during the last few frames
#[derive(Debug, Clone)]
pub struct HeldKeys {
    frames_left: [u8; keyboard::SIZE],
    hold: u8,
}

impl HeldKeys {
    pub fn new(hold: u8) -> Self {
        Self {
            frames_left: [0; keyboard::SIZE],
            hold: hold.max(1),
        }
    }

    /// Will (re)start holding the given key
    pub fn press(&mut self, key: usize) {
        if let Some(frames) = self.frames_left.get_mut(key) {
            *frames = self.hold;
        }
    }

    /// Will move a single frame forward, releasing keys that were not
    /// pressed again.
    pub fn tick(&mut self) {
        for frames in self.frames_left.iter_mut() {
            *frames = frames.saturating_sub(1);
        }
    }
}

impl KeyboardCommands for HeldKeys {
    fn pressed(&self, key: usize) -> bool {
        self.frames_left.get(key).map_or(false, |&frames| frames > 0)
    }
}
