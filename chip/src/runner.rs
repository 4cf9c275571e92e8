use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::{
    chip8::ChipSet,
    config::Config,
    definitions::keyboard,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands},
    display::Framebuffer,
    opcode::Operation,
    registers::RegisterFile,
    resources::Rom,
    timer::{TimedWorker, TimerClock, Worker},
    ProcessError,
};

/// The state the execution loop is in.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Instructions are being executed
    Running,
    /// An `FX0A` is waiting for any key to go down
    WaitingForKey,
    /// The program jumped onto itself and will never progress again
    Halted,
    /// Execution stopped because of the given fault
    Faulted(ProcessError),
}

/// Everything the two loops share, only ever touched while holding the lock.
struct Machine {
    chip: ChipSet,
    status: RunStatus,
    shutdown: bool,
}

struct Shared {
    machine: Mutex<Machine>,
    /// signaled every time a key goes down, or on shutdown
    key_down: Condvar,
}

/// Runs a chip on two timed workers, one executing instructions and the
/// other one ticking the timers.
pub struct Emulator<W: TimedWorker = Worker> {
    shared: Arc<Shared>,
    cpu: W,
    timers: W,
}

impl<W: TimedWorker> Emulator<W> {
    /// Will load the rom into a fresh chip and start running it
    pub fn new<S>(rom: Rom, config: Config, sound: S) -> Self
    where
        S: SoundCommands + 'static,
    {
        Self::with_chip(ChipSet::new(rom), config, sound)
    }

    /// Will start running the given chip
    pub fn with_chip<S>(chip: ChipSet, config: Config, mut sound: S) -> Self
    where
        S: SoundCommands + 'static,
    {
        log::info!(
            "Starting '{}' with a {:?} cpu interval",
            chip.get_name(),
            config.cpu_interval()
        );

        let shared = Arc::new(Shared {
            machine: Mutex::new(Machine {
                chip,
                status: RunStatus::Running,
                shutdown: false,
            }),
            key_down: Condvar::new(),
        });

        let halt_on_idle_loop = config.get_halt_on_idle_loop();
        let cpu_shared = shared.clone();
        let execute = move || {
            let shared = &cpu_shared;
            let mut machine = shared.machine.lock();
            if machine.shutdown {
                return false;
            }

            if halt_on_idle_loop && machine.chip.in_idle_loop() {
                log::info!("'{}' entered an idle loop, halting", machine.chip.get_name());
                machine.status = RunStatus::Halted;
                return false;
            }

            match machine.chip.next() {
                Ok(Operation::Wait) => {
                    machine.status = RunStatus::WaitingForKey;
                    log::debug!("Waiting for a key press");
                    while !machine.shutdown && !machine.chip.get_keyboard().contains(&true) {
                        shared.key_down.wait(&mut machine);
                    }
                    // the opcode is run again on the next call and picks up the key
                    machine.status = RunStatus::Running;
                    !machine.shutdown
                }
                Ok(_) => true,
                Err(err) => {
                    log::error!("Execution of '{}' failed: {}", machine.chip.get_name(), err);
                    machine.status = RunStatus::Faulted(err);
                    false
                }
            }
        };

        let mut clock = TimerClock::new(config.get_sound_policy());
        let timer_shared = shared.clone();
        let tick = move || {
            let event = {
                let mut machine = timer_shared.machine.lock();
                if machine.shutdown {
                    return false;
                }
                machine.chip.tick_timers(&mut clock)
            };
            if let Some(event) = event {
                log::debug!("Sound event {:?}", event);
                event.apply(&mut sound);
            }
            true
        };

        let mut cpu = W::new();
        cpu.start(execute, config.cpu_interval());
        let mut timers = W::new();
        timers.start(tick, config.timer_interval());

        Self {
            shared,
            cpu,
            timers,
        }
    }

    /// Will overwrite the keyboard state, a new key press wakes up a waiting `FX0A`.
    pub fn set_keys(&self, keys: &[bool; keyboard::SIZE]) {
        let mut machine = self.shared.machine.lock();
        if machine.chip.set_keyboard(keys) {
            self.shared.key_down.notify_all();
        }
    }

    /// Will read the keyboard state from the given provider
    pub fn refresh_keys<K: KeyboardCommands + ?Sized>(&self, provider: &K) {
        let mut machine = self.shared.machine.lock();
        if machine.chip.refresh_keyboard(provider) {
            self.shared.key_down.notify_all();
        }
    }

    /// A copy of the current display
    pub fn snapshot(&self) -> Framebuffer {
        *self.shared.machine.lock().chip.get_display()
    }

    /// Will hand the current display to the given device, the lock is
    /// released before the device gets to draw.
    pub fn present<D: DisplayCommands + ?Sized>(&self, display: &mut D) {
        let frame = self.snapshot();
        display.display(&frame);
    }

    pub fn status(&self) -> RunStatus {
        self.shared.machine.lock().status.clone()
    }

    /// A copy of the current cpu registers
    pub fn registers(&self) -> RegisterFile {
        self.shared.machine.lock().chip.get_registers().clone()
    }

    /// The pretty printed state of the whole chip
    pub fn dump(&self) -> String {
        format!("{}", self.shared.machine.lock().chip)
    }

    /// Is the execution loop still running
    pub fn is_running(&self) -> bool {
        self.cpu.is_alive()
    }

    /// Will stop both loops, a pending key wait is released.
    pub fn stop(&mut self) {
        {
            let mut machine = self.shared.machine.lock();
            if !machine.shutdown {
                log::info!("Stopping '{}'", machine.chip.get_name());
            }
            machine.shutdown = true;
            self.shared.key_down.notify_all();
        }
        self.cpu.stop();
        self.timers.stop();
    }
}

impl<W: TimedWorker> Drop for Emulator<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{devices::MockDisplayCommands, timer::SoundEvent, OpcodeError};

    /// Records every sound request
    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<SoundEvent>>>,
    }

    impl SoundCommands for Recorder {
        fn play(&mut self, duration: Duration) {
            self.events.lock().push(SoundEvent::Play(duration));
        }

        fn stop(&mut self) {
            self.events.lock().push(SoundEvent::Stop);
        }
    }

    fn start(program: &[u8]) -> (Emulator, Recorder) {
        let rom = Rom::new("runner", program.to_vec()).unwrap();
        let chip = ChipSet::new(rom).with_rng(StdRng::seed_from_u64(0));
        let sound = Recorder::default();
        let config = Config::new().cpu_hertz(2_000);
        (Emulator::with_chip(chip, config, sound.clone()), sound)
    }

    /// Polls the status until the check passes or a few seconds went by
    fn wait_for<F: Fn(&RunStatus) -> bool>(emulator: &Emulator, check: F) -> RunStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = emulator.status();
            if check(&status) || Instant::now() > deadline {
                return status;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_halts_on_idle_loop() {
        let (emulator, _) = start(&[0x60, 0x05, 0x70, 0x03, 0x12, 0x04]);

        let status = wait_for(&emulator, |status| *status == RunStatus::Halted);
        assert_eq!(status, RunStatus::Halted);

        let registers = emulator.registers();
        assert_eq!(registers.v[0], 8);
        assert_eq!(registers.pc, 0x204);
        thread::sleep(Duration::from_millis(20));
        assert!(!emulator.is_running());
    }

    #[test]
    fn test_key_wait_resumes() {
        let (emulator, _) = start(&[0xF3, 0x0A, 0x12, 0x02]);

        let status = wait_for(&emulator, |status| *status == RunStatus::WaitingForKey);
        assert_eq!(status, RunStatus::WaitingForKey);
        assert_eq!(emulator.registers().pc, 0x200);

        let mut keys = [false; 16];
        keys[0x7] = true;
        emulator.set_keys(&keys);

        let status = wait_for(&emulator, |status| *status == RunStatus::Halted);
        assert_eq!(status, RunStatus::Halted);
        let registers = emulator.registers();
        assert_eq!(registers.v[0x3], 0x7);
        assert_eq!(registers.pc, 0x202);
    }

    #[test]
    fn test_stop_releases_key_wait() {
        let (mut emulator, _) = start(&[0xF3, 0x0A]);
        wait_for(&emulator, |status| *status == RunStatus::WaitingForKey);

        emulator.stop();
        assert!(!emulator.is_running());
    }

    #[test]
    fn test_fault_stops_execution() {
        let (emulator, _) = start(&[0xE0, 0xFF]);

        let status = wait_for(&emulator, |status| matches!(status, RunStatus::Faulted(_)));
        assert_eq!(
            status,
            RunStatus::Faulted(ProcessError::Opcode(OpcodeError::InvalidOpcode(0xE0FF)))
        );
    }

    #[test]
    fn test_sound_and_display() {
        // V0 = 30, ST = V0, draw glyph 0, idle
        let (emulator, sound) = start(&[0x60, 0x1E, 0xF0, 0x18, 0xD1, 0x15, 0x12, 0x06]);
        wait_for(&emulator, |status| *status == RunStatus::Halted);

        let deadline = Instant::now() + Duration::from_secs(5);
        while sound.events.lock().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(
            sound.events.lock().first(),
            Some(&SoundEvent::Play(Duration::from_millis(500)))
        );

        let frame = emulator.snapshot();
        assert_eq!(frame.rows()[0], 0xF0 << 56);

        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .withf(move |shown| *shown == frame)
            .times(1)
            .return_const(());
        emulator.present(&mut display);

        assert!(emulator.dump().contains("\tProgram Name :\n\t\trunner\n"));
    }
}
