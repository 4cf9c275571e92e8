use thiserror::Error;

use crate::opcode::Opcode;

/// A fault raised while fetching, decoding or executing a single instruction.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid calculation '{0}'")]
    Calculation(String),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer:#06X}, if data len is {len:#06X}")]
    MemoryInvalid { pointer: usize, len: usize },
    #[error("Pointer location {0:#06X} is not aligned to an opcode boundary")]
    Misaligned(usize),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("The range {from:#06X}..{to:#06X} is outside of the {len:#06X} byte memory")]
    OutOfBounds { from: usize, to: usize, len: usize },
}

/// A fault raised while preparing a program image.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("The program image is empty.")]
    Empty,
    #[error("The program image is {len} bytes long, but at most {max} bytes fit into memory.")]
    TooLarge { len: usize, max: usize },
    #[error("Unable to read the program image.")]
    Io(#[from] std::io::Error),
}
