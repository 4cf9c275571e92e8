use {
    crate::{
        config::SoundPolicy, definitions::timer, devices::SoundCommands,
        registers::RegisterFile,
    },
    std::{
        sync::{
            mpsc::{self, RecvTimeoutError, SyncSender},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    },
};

/// What the timer clock asks of the audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// Start a tone lasting the given duration
    Play(Duration),
    /// Stop the current tone
    Stop,
}

impl SoundEvent {
    /// Will forward the event to the audio device
    pub fn apply<S: SoundCommands + ?Sized>(self, sound: &mut S) {
        match self {
            SoundEvent::Play(duration) => sound.play(duration),
            SoundEvent::Stop => sound.stop(),
        }
    }
}

/// The time a sound timer value stands for
fn ticks_to_duration(ticks: u8) -> Duration {
    Duration::from_micros(ticks as u64 * 1_000_000 / timer::HERTZ)
}

/// Drives the delay and sound timers, it has to be ticked at 60Hz.
#[derive(Debug, Clone)]
pub struct TimerClock {
    policy: SoundPolicy,
    /// only used by the countdown policy
    sounding: bool,
}

impl TimerClock {
    pub fn new(policy: SoundPolicy) -> Self {
        Self {
            policy,
            sounding: false,
        }
    }

    /// Will move both timers forward by a single tick.
    pub fn tick(&mut self, registers: &mut RegisterFile) -> Option<SoundEvent> {
        registers.dt = registers.dt.saturating_sub(1);

        match self.policy {
            SoundPolicy::OneShot => {
                if registers.st > 0 {
                    let event = SoundEvent::Play(ticks_to_duration(registers.st));
                    registers.st = 0;
                    Some(event)
                } else {
                    None
                }
            }
            SoundPolicy::Countdown => {
                if registers.st > 0 {
                    let event = if self.sounding {
                        None
                    } else {
                        Some(SoundEvent::Play(ticks_to_duration(registers.st)))
                    };
                    self.sounding = true;
                    registers.st -= 1;
                    event
                } else if self.sounding {
                    self.sounding = false;
                    Some(SoundEvent::Stop)
                } else {
                    None
                }
            }
        }
    }
}

/// Runs a callback at a fixed interval on its own thread.
pub trait TimedWorker {
    fn new() -> Self;
    /// The callback is run every interval, until it returns false or the worker is stopped.
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the actuall threads used. It uses an ```()``` so that it doesn't use
    /// up too much memory.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// all duration.
    /// Attention the timer assumes the callback will finish
    /// calculation faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() -> bool + 'static,
    {
        // stop any action around
        self.stop();

        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            // this is to count the references, as it will not actually
            // be used ```_``` is used in front of the name.
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        if !callback() {
                            break;
                        }

                        // make sure there the system will at most wait the interval
                        timeout = interval.saturating_sub(start.elapsed());
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker.
    fn stop(&mut self) {
        // Will stop the worker, in two steps one by sending an empty message
        // and second by droping the only sender for the given receiver.
        if let Some(sender) = self.shutdown.take() {
            // the thread might have already finished by itself
            let _ = sender.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The worker thread panicked.");
            }
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    /// Will drop the worker
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::devices::MockSoundCommands;

    #[test]
    fn test_delay_timer_counts_down() {
        let mut clock = TimerClock::new(SoundPolicy::OneShot);
        let mut registers = RegisterFile::new();
        registers.dt = 2;

        assert_eq!(clock.tick(&mut registers), None);
        assert_eq!(registers.dt, 1);
        clock.tick(&mut registers);
        assert_eq!(registers.dt, 0);
        clock.tick(&mut registers);
        assert_eq!(registers.dt, 0);
    }

    #[test]
    fn test_one_shot_sound() {
        let mut clock = TimerClock::new(SoundPolicy::OneShot);
        let mut registers = RegisterFile::new();
        registers.st = 30;

        assert_eq!(
            clock.tick(&mut registers),
            Some(SoundEvent::Play(Duration::from_millis(500)))
        );
        assert_eq!(registers.st, 0);
        assert_eq!(clock.tick(&mut registers), None);
    }

    #[test]
    fn test_countdown_sound() {
        let mut clock = TimerClock::new(SoundPolicy::Countdown);
        let mut registers = RegisterFile::new();
        registers.st = 2;

        assert!(matches!(
            clock.tick(&mut registers),
            Some(SoundEvent::Play(_))
        ));
        assert_eq!(registers.st, 1);
        assert_eq!(clock.tick(&mut registers), None);
        assert_eq!(registers.st, 0);
        assert_eq!(clock.tick(&mut registers), Some(SoundEvent::Stop));
        assert_eq!(clock.tick(&mut registers), None);
    }

    #[test]
    fn test_sound_event_reaches_device() {
        let mut sound = MockSoundCommands::new();
        sound
            .expect_play()
            .withf(|duration| *duration == Duration::from_micros(16_666))
            .times(1)
            .return_const(());
        sound.expect_stop().times(1).return_const(());

        SoundEvent::Play(ticks_to_duration(1)).apply(&mut sound);
        SoundEvent::Stop.apply(&mut sound);
    }

    #[test]
    fn test_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ccounter = counter.clone();

        let mut worker = Worker::new();
        worker.start(
            move || {
                ccounter.fetch_add(1, Ordering::SeqCst);
                true
            },
            Duration::from_millis(5),
        );
        assert!(worker.is_alive());

        std::thread::sleep(Duration::from_millis(100));
        worker.stop();
        assert!(!worker.is_alive());
        assert!(counter.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_worker_finishes_by_itself() {
        let mut worker = Worker::new();
        worker.start(|| false, Duration::from_millis(1));

        std::thread::sleep(Duration::from_millis(100));
        assert!(!worker.is_alive());
        worker.stop();
    }
}
