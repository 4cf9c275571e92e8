//! The 4KB address space of the chip.
use crate::{
    definitions::{cpu, display::fontset, memory},
    opcode::{self, Opcode},
    resources::Rom,
    MemoryError, OpcodeError,
};

/// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
/// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
/// - `0x200-0xFFF` - Program ROM and work RAM
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryBank {
    ram: Box<[u8; memory::SIZE]>,
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBank")
            .field("size", &self.ram.len())
            .finish()
    }
}

impl MemoryBank {
    /// Will create the memory with the font set already in place
    pub fn new() -> Self {
        let mut ram = Box::new([0; memory::SIZE]);
        ram[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);
        Self { ram }
    }

    /// Will create the memory and write the rom data into it
    pub fn with_rom(rom: &Rom) -> Self {
        let mut bank = Self::new();
        let data = rom.get_data();
        // the rom size was validated while creating it
        bank.ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())]
            .copy_from_slice(data);
        bank
    }

    /// Checks the range `from..from + len`
    fn range(from: usize, len: usize) -> Result<std::ops::Range<usize>, MemoryError> {
        let to = from + len;
        if to > memory::SIZE {
            Err(MemoryError::OutOfBounds {
                from,
                to,
                len: memory::SIZE,
            })
        } else {
            Ok(from..to)
        }
    }

    /// Will return the `len` bytes starting at `from`
    pub fn read(&self, from: usize, len: usize) -> Result<&[u8], MemoryError> {
        let range = Self::range(from, len)?;
        Ok(&self.ram[range])
    }

    /// Will write the data starting at `from`, nothing is written if the
    /// data does not fit.
    pub fn write(&mut self, from: usize, data: &[u8]) -> Result<(), MemoryError> {
        let range = Self::range(from, data.len())?;
        self.ram[range].copy_from_slice(data);
        Ok(())
    }

    /// Will build the opcode stored at the given pointer
    pub fn fetch(&self, pointer: usize) -> Result<Opcode, OpcodeError> {
        if pointer % memory::opcodes::SIZE != 0 {
            return Err(OpcodeError::Misaligned(pointer));
        }
        opcode::build_opcode(&self.ram[..], pointer)
    }

    /// The full memory content
    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_is_loaded() {
        let bank = MemoryBank::new();
        assert_eq!(bank.read(0, 5), Ok(&[0xF0, 0x90, 0x90, 0x90, 0xF0][..]));
        assert_eq!(bank.read(0x4B, 5), Ok(&[0xF0, 0x80, 0xF0, 0x80, 0x80][..]));
        assert_eq!(bank.read(0x50, 1), Ok(&[0][..]));
    }

    #[test]
    fn test_rom_is_loaded() {
        let rom = Rom::new("test", vec![0x60, 0x05, 0x70, 0x03]).unwrap();
        let bank = MemoryBank::with_rom(&rom);
        assert_eq!(bank.fetch(0x200), Ok(0x6005));
        assert_eq!(bank.fetch(0x202), Ok(0x7003));
        assert_eq!(bank.fetch(0x204), Ok(0x0000));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut bank = MemoryBank::new();
        let err = MemoryError::OutOfBounds {
            from: 0xFFE,
            to: 0x1001,
            len: 0x1000,
        };
        assert_eq!(bank.write(0xFFE, &[1, 2, 3]), Err(err));
        // nothing was written
        assert_eq!(bank.read(0xFFE, 2), Ok(&[0, 0][..]));
        assert!(bank.read(0x1000, 1).is_err());
        assert!(bank.write(0xFFD, &[1, 2, 3]).is_ok());
        assert_eq!(bank.read(memory::LAST, 1), Ok(&[3][..]));
    }

    #[test]
    fn test_fetch_bounds() {
        let bank = MemoryBank::new();
        assert!(bank.fetch(0xFFE).is_ok());
        assert_eq!(
            bank.fetch(0x1000),
            Err(OpcodeError::MemoryInvalid {
                pointer: 0x1000,
                len: 0x1000
            })
        );
        assert_eq!(bank.fetch(0x201), Err(OpcodeError::Misaligned(0x201)));
    }
}
