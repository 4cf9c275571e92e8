use std::convert::TryFrom;

use {
    crate::{
        definitions::keyboard,
        devices::{Keyboard, KeyboardCommands},
        display::Framebuffer,
        memory::MemoryBank,
        opcode::{ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        registers::RegisterFile,
        resources::Rom,
        timer::{SoundEvent, TimerClock},
        ProcessError,
    },
    rand::{rngs::StdRng, RngCore, SeedableRng},
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// The 4KB address space with the font and the program loaded
    pub(super) memory: MemoryBank,
    /// The data registers, the index register, the program counter,
    /// the stack and both timers.
    pub(super) registers: RegisterFile,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: Framebuffer,
    /// The last known state of the hex keyboard
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object
    pub fn new(rom: Rom) -> Self {
        log::info!(
            "Loading '{}' with {} bytes",
            rom.get_name(),
            rom.get_data().len()
        );

        Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: MemoryBank::with_rom(&rom),
            registers: RegisterFile::new(),
            display: Framebuffer::new(),
            keyboard: Keyboard::new(),
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Will replace the random number generator
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        self.opcode = self.memory.fetch(self.registers.pc as usize)?;
        Ok(())
    }

    /// will advance the program by a single step
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        self.set_opcode()?;
        log::trace!(
            "Opcode: {:#06X} PC: {:#05X}",
            self.opcode,
            self.registers.pc
        );

        let operation = self.execute(self.opcode)?;

        log::trace!(
            "I: {:#05X} SP: {:X} Stack: {:X?} V: {:X?}",
            self.registers.i,
            self.registers.sp(),
            self.registers.stack(),
            self.registers.v
        );
        Ok(operation)
    }

    /// Will decode and run the given opcode against the current state.
    pub fn execute(&mut self, opcode: Opcode) -> Result<Operation, ProcessError> {
        let instruction = Instruction::try_from(opcode)?;
        self.calc(&instruction)
    }

    /// Checks if the opcode at the program counter jumps onto itself,
    /// in which case the program will never progress again.
    pub fn in_idle_loop(&self) -> bool {
        let pc = self.registers.pc;
        matches!(
            self.memory.fetch(pc as usize).map(Instruction::try_from),
            Ok(Ok(Instruction::Jump(address))) if address.nnn == pc
        )
    }

    /// Will write keyboard data into interncal keyboard representation,
    /// returns true if any key went down.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) -> bool {
        self.keyboard.set_mult(keys)
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) -> bool {
        self.keyboard.set_key(key, to)
    }

    /// Will read the keyboard state from the given provider
    pub fn refresh_keyboard<K: KeyboardCommands + ?Sized>(&mut self, provider: &K) -> bool {
        self.keyboard.refresh(provider)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// Will move the delay and sound timers a single tick forward
    pub fn tick_timers(&mut self, clock: &mut TimerClock) -> Option<SoundEvent> {
        clock.tick(&mut self.registers)
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.registers.st
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.registers.dt
    }

    /// Will return the current display state
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    /// Will return the cpu registers
    pub fn get_registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Will return the name of the loaded rom
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl ProgramCounter for ChipSet {
    fn step(&mut self, step: ProgramCounterStep) {
        // the program counter keeps its 16 bit width, any address outside
        // of memory is rejected on the next fetch
        self.registers.pc = step.apply(self.registers.pc as usize) as u16;
    }
}
