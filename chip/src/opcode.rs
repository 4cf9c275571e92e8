//! Opcode abstractions, the decoder and the instruction table.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the upper twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the upper eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the upper four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the lower four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the lower eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the lower twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a nibble
const NIBBLE: u16 = 0x4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(Err(err), build_opcode(&SPLIT_OPCODE, pointer));
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// The raw fields of an opcode, every `u16` can be split into these.
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// let fields = Fields::decode(0xD12A);
/// assert_eq!(fields.class, 0xD);
/// assert_eq!((fields.x, fields.y, fields.n), (0x1, 0x2, 0xA));
/// assert_eq!(fields.kk, 0x2A);
/// assert_eq!(fields.nnn, 0x12A);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    /// the top nibble
    pub class: u8,
    /// bits 8 to 11, a register index
    pub x: usize,
    /// bits 4 to 7, a register index
    pub y: usize,
    /// bits 0 to 3
    pub n: u8,
    /// bits 0 to 7, a constant
    pub kk: u8,
    /// bits 0 to 11, an address
    pub nnn: u16,
}

impl Fields {
    /// Pure decoder from the opcode into its fields.
    pub fn decode(opcode: Opcode) -> Self {
        Self {
            class: ((opcode & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8,
            x: ((opcode & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize,
            y: ((opcode & OPCODE_MASK_00FF & OPCODE_MASK_FFF0) >> NIBBLE) as usize,
            n: (opcode & OPCODE_MASK_000F) as u8,
            kk: (opcode & OPCODE_MASK_00FF) as u8,
            nnn: opcode & OPCODE_MASK_0FFF,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Will calculate the new program counter from the current one.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::None.apply(0x200), 0x200);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x200), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, pc: usize) -> usize {
        match *self {
            ProgramCounterStep::Next => pc + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => pc + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// implSubOpcode is a macro responsible for creating the boilerplate code
/// needed for mapping the sub opcode part onto its enum.
macro_rules! implSubOpcode {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        impl TryFrom<$type_from> for $type_name {
            type Error = ();

            fn try_from(value: $type_from) -> Result<Self, Self::Error> {
                match value {
                    $(
                        $key => Ok($val),
                    )+
                    _ => Err(()),
                }
            }
        }
    };
}

/// The `0NNN` family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// Clears the display
    Clear,
    /// Returns from the subroutine
    Return,
    /// Calls a machine code routine, which is ignored
    Routine(u16),
}

/// An opcode of the form `TNNN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub nnn: u16,
}

/// An opcode of the form `TXKK`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterByte {
    pub x: usize,
    pub kk: u8,
}

/// An opcode of the form `TXY0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub x: usize,
    pub y: usize,
}

/// An opcode of the form `DXYN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub n: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

implSubOpcode!(ArithmeticOp : u8 :
    // 8XY0
    // Sets VX to the value of VY.
    0x0 => ArithmeticOp::Assign,
    // 8XY1
    // Sets VX to VX or VY. (Bitwise OR operation)
    0x1 => ArithmeticOp::Or,
    // 8XY2
    // Sets VX to VX and VY. (Bitwise AND operation)
    0x2 => ArithmeticOp::And,
    // 8XY3
    // Sets VX to VX xor VY.
    0x3 => ArithmeticOp::Xor,
    // 8XY4
    // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    0x4 => ArithmeticOp::Add,
    // 8XY5
    // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x5 => ArithmeticOp::Sub,
    // 8XY6
    // Stores the least significant bit of VX in VF and then shifts VX to the right
    // by 1.
    0x6 => ArithmeticOp::ShiftRight,
    // 8XY7
    // Sets VY to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x7 => ArithmeticOp::SubReverse,
    // 8XYE
    // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
    0xE => ArithmeticOp::ShiftLeft,
);

/// An opcode of the form `8XYT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub op: ArithmeticOp,
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Pressed,
    NotPressed,
}

implSubOpcode!(KeyOp : u8 :
    // EX9E
    0x9E => KeyOp::Pressed,
    // EXA1
    0xA1 => KeyOp::NotPressed,
);

/// An opcode of the form `EXTT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub op: KeyOp,
    pub x: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    /// `FX29`, only the digits `0x0-0xF` have a glyph, any other value in
    /// `VX` is a calculation fault instead of pointing `I` past the font.
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

implSubOpcode!(MiscOp : u8 :
    0x07 => MiscOp::GetDelayTimer,
    0x0A => MiscOp::AwaitKeyPress,
    0x15 => MiscOp::SetDelayTimer,
    0x18 => MiscOp::SetSoundTimer,
    0x1E => MiscOp::AddVxToI,
    0x29 => MiscOp::SetIToSprite,
    0x33 => MiscOp::StoreBCD,
    0x55 => MiscOp::StoreV0ToVx,
    0x65 => MiscOp::FillV0ToVx,
);

/// An opcode of the form `FXTT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub op: MiscOp,
    pub x: usize,
}

/// A fully decoded instruction, one variant per opcode class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    System(System),
    Jump(Address),
    Call(Address),
    SkipIfEqual(RegisterByte),
    SkipIfNotEqual(RegisterByte),
    SkipIfRegistersEqual(RegisterPair),
    Load(RegisterByte),
    Add(RegisterByte),
    Arithmetic(Arithmetic),
    SkipIfRegistersNotEqual(RegisterPair),
    LoadIndex(Address),
    JumpOffset(Address),
    Random(RegisterByte),
    Draw(Sprite),
    Key(Key),
    Misc(Misc),
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let invalid = |_| OpcodeError::InvalidOpcode(value);

        let fields = Fields::decode(value);
        let Fields {
            class,
            x,
            y,
            n,
            kk,
            nnn,
        } = fields;

        let address = Address { nnn };
        let byte = RegisterByte { x, kk };
        // the low nibble of 5XYN and 9XYN is not looked at
        let pair = RegisterPair { x, y };

        let res = match class {
            0x0 => Instruction::System(match value {
                0x00E0 => System::Clear,
                0x00EE => System::Return,
                _ => System::Routine(nnn),
            }),
            0x1 => Instruction::Jump(address),
            0x2 => Instruction::Call(address),
            0x3 => Instruction::SkipIfEqual(byte),
            0x4 => Instruction::SkipIfNotEqual(byte),
            0x5 => Instruction::SkipIfRegistersEqual(pair),
            0x6 => Instruction::Load(byte),
            0x7 => Instruction::Add(byte),
            0x8 => Instruction::Arithmetic(Arithmetic {
                op: ArithmeticOp::try_from(n).map_err(invalid)?,
                x,
                y,
            }),
            0x9 => Instruction::SkipIfRegistersNotEqual(pair),
            0xA => Instruction::LoadIndex(address),
            0xB => Instruction::JumpOffset(address),
            0xC => Instruction::Random(byte),
            0xD => Instruction::Draw(Sprite { x, y, n }),
            0xE => Instruction::Key(Key {
                op: KeyOp::try_from(kk).map_err(invalid)?,
                x,
            }),
            0xF => Instruction::Misc(Misc {
                op: MiscOp::try_from(kk).map_err(invalid)?,
                x,
            }),
            _ => return Err(OpcodeError::InvalidOpcode(value)),
        };
        Ok(res)
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the caller.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The instruction did not complete, it has to be run
    /// again after the next key press.
    Wait,
    /// The display changed
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the  [`ProgramCounter`](ProgramCounter) trait,
/// as every instruction ends with exactly one program counter step.
pub trait ChipOpcodes: ProgramCounter {
    /// will execute a single instruction, moving the program counter afterwards
    fn calc(&mut self, instruction: &Instruction) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let step_op = |(step, op)| {
            operation = op;
            step
        };

        let step = match instruction {
            Instruction::System(opcode) => self.system(opcode).map(step_op),
            Instruction::Jump(opcode) => self.jump(opcode),
            Instruction::Call(opcode) => self.call(opcode),
            Instruction::SkipIfEqual(opcode) => self.skip_if_equal(opcode),
            Instruction::SkipIfNotEqual(opcode) => self.skip_if_not_equal(opcode),
            Instruction::SkipIfRegistersEqual(opcode) => self.skip_if_registers_equal(opcode),
            Instruction::Load(opcode) => self.load(opcode),
            Instruction::Add(opcode) => self.add(opcode),
            Instruction::Arithmetic(opcode) => self.arithmetic(opcode),
            Instruction::SkipIfRegistersNotEqual(opcode) => {
                self.skip_if_registers_not_equal(opcode)
            }
            Instruction::LoadIndex(opcode) => self.load_index(opcode),
            Instruction::JumpOffset(opcode) => self.jump_offset(opcode),
            Instruction::Random(opcode) => self.random(opcode),
            Instruction::Draw(opcode) => self.draw(opcode).map(step_op),
            Instruction::Key(opcode) => self.key(opcode),
            Instruction::Misc(opcode) => self.misc(opcode).map(step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// A multiuse opcode base for type `0NNN`
    ///
    /// - `0NNN` - Call     -                       - Calls machine code routine ([RCA 1802](https://en.wikipedia.org/wiki/RCA_1802) for COSMAC VIP) at address `NNN`. Ignored.
    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn system(&mut self, opcode: &System)
        -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XKK` - Cond    - `if(Vx==KK)`          - Skips the next instruction if `VX` equals `KK`.
    fn skip_if_equal(&self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `4XKK` - Cond     - `if(Vx!=KK)`          - Skips the next instruction if `VX` doesn' t equal `KK`.
    fn skip_if_not_equal(&self, opcode: &RegisterByte)
        -> Result<ProgramCounterStep, ProcessError>;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn skip_if_registers_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XKK` - Const    - `Vx = KK`             - Sets `VX` to `KK`.
    fn load(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `7XKK` - Const    - `Vx += KK`            - Adds `KK` to `VX`. (Carry flag is not changed)
    fn add(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// A mutiuse opcode base for type `8XYT` (T is a sub obcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`. (Bitwise OR operation)
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`. (Bitwise AND operation)
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`. (Bitwise XOR operation)
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from VX. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx>>=1`              - Stores the least significant bit of `VX` in `VF` and then shifts VX to the right by `1`.
    /// - `8XY7` - Math     - `Vy=Vy-Vx`            - Sets `VY` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx<<=1`              - Stores the most significant bit of `VX` in `VF` and then shifts `VX` to the left by `1`.
    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn skip_if_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM    - `I = NNN`             - Sets `I` to the address `NNN`.
    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `BNNN` - Flow    - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `CXKK` - Rand     - `Vx=rand()&KK`        - Sets `VX` to the result of a bitwise and operation on a random number and `KK`.
    fn random(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels. Each row of `8` pixels is read as bit-coded starting from memory location `I`; `I` value doesn’t change after the execution of this instruction. `VF` is set to `1` if any screen pixels are flipped from set to unset when the sprite is drawn, and to `0` if that doesn’t happen
    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, ProcessError>;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`. (Blocking Operation. All instruction halted until next key event)
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the sprite for the character in `VX`.
    /// - `FX33` - BCD      - `246 / 100 => 2` `246 / 10 => 24 % 10 => 4` `246 % 10 => 6` - Stores the [binary-coded decimal](https://en.wikipedia.org/wiki/Binary-coded_decimal) representation of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX`  (including `VX`) in memory starting at address `I`. `I` itself is left unmodified.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`. `I` itself is left unmodified.
    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}
