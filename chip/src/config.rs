//! Runtime configuration of the emulator.
use std::time::Duration;

use crate::definitions::{cpu, timer};

/// How the sound timer drives the audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundPolicy {
    /// As soon as the sound timer is non zero a tone of `ST / 60` seconds is
    /// requested and the timer is reset to zero.
    OneShot,
    /// The sound timer counts down once per tick, the tone starts when it
    /// becomes non zero and stops when it reaches zero again.
    Countdown,
}

impl Default for SoundPolicy {
    fn default() -> Self {
        SoundPolicy::OneShot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    cpu_hertz: u64,
    timer_hertz: u64,
    sound_policy: SoundPolicy,
    halt_on_idle_loop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
            timer_hertz: timer::HERTZ,
            sound_policy: SoundPolicy::default(),
            halt_on_idle_loop: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /* Config builder functions */
    pub fn cpu_hertz(mut self, value: u64) -> Self {
        self.cpu_hertz = value.max(1);
        self
    }

    pub fn timer_hertz(mut self, value: u64) -> Self {
        self.timer_hertz = value.max(1);
        self
    }

    pub fn sound_policy(mut self, value: SoundPolicy) -> Self {
        self.sound_policy = value;
        self
    }

    /// Stop executing once the program jumps onto itself
    pub fn halt_on_idle_loop(mut self, value: bool) -> Self {
        self.halt_on_idle_loop = value;
        self
    }

    pub fn get_sound_policy(&self) -> SoundPolicy {
        self.sound_policy
    }

    pub fn get_halt_on_idle_loop(&self) -> bool {
        self.halt_on_idle_loop
    }

    /// The time between two instructions
    pub fn cpu_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.cpu_hertz)
    }

    /// The time between two timer ticks
    pub fn timer_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.timer_hertz)
    }
}
