//! The cpu registers, the return stack and the two countdown timers.
use tinyvec::ArrayVec;

use crate::{
    definitions::cpu::{self, register},
    StackError,
};

/// The RegisterFile holds every piece of cpu state that is not memory
/// or display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub v: [u8; register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`. Only the lower twelve bits address memory.
    pub i: u16,
    /// The program counter has the address of the next instruction to be
    /// executed from memory.
    pub pc: u16,
    /// The stack is only used to store return addresses when subroutines are called.
    /// Its length is the stack pointer.
    stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: counts down at 60 hertz, until it reaches 0.
    pub dt: u8,
    /// Sound timer: a tone is emitted while or once it is non zero.
    pub st: u8,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            v: [0; register::SIZE],
            i: 0,
            pc: cpu::PROGRAM_COUNTER as u16,
            stack: ArrayVec::new(),
            dt: 0,
            st: 0,
        }
    }

    /// The flag register `VF`
    pub fn flag(&self) -> u8 {
        self.v[register::LAST]
    }

    /// Writes the flag register `VF`
    pub fn set_flag(&mut self, value: bool) {
        self.v[register::LAST] = value as u8;
    }

    /// The stack pointer, always pointing to the next free entry
    pub fn sp(&self) -> u8 {
        self.stack.len() as u8
    }

    /// All the return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// Will push the given return address to the stack
    pub fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        // try_push hands the value back when the array is at capacity
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop the last return address from the stack
    pub fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// testing internal functionality of popping and pushing into the stack
    fn test_push_pop_stack() {
        let mut registers = RegisterFile::new();
        assert_eq!(registers.sp(), 0);

        let next_counter = 0x0133 + cpu::PROGRAM_COUNTER as u16;

        for i in 0..cpu::stack::SIZE as u16 {
            assert_eq!(Ok(()), registers.push_stack(next_counter + i * 8));
        }
        // check for the correct error message
        assert_eq!(Err(StackError::Full), registers.push_stack(next_counter));
        assert_eq!(cpu::stack::SIZE as u8, registers.sp());

        for i in (0..cpu::stack::SIZE as u16).rev() {
            assert_eq!(Ok(next_counter + i * 8), registers.pop_stack());
        }
        assert_eq!(registers.sp(), 0);
        assert_eq!(Err(StackError::Empty), registers.pop_stack());
    }

    #[test]
    fn test_initial_state() {
        let registers = RegisterFile::default();
        assert_eq!(registers.pc, 0x200);
        assert_eq!(registers.i, 0);
        assert_eq!(registers.v, [0; 16]);
        assert!(registers.stack().is_empty());
        assert_eq!((registers.dt, registers.st), (0, 0));
    }

    #[test]
    fn test_flag() {
        let mut registers = RegisterFile::new();
        registers.set_flag(true);
        assert_eq!(registers.flag(), 1);
        assert_eq!(registers.v[0xF], 1);
        registers.set_flag(false);
        assert_eq!(registers.flag(), 0);
    }
}
