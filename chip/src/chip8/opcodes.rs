use crate::{
    definitions::display::fontset,
    opcode::{
        Address, Arithmetic, ArithmeticOp, ChipOpcodes, Key, KeyOp, Misc, MiscOp, Operation,
        ProgramCounterStep, RegisterByte, RegisterPair, Sprite, System,
    },
    ProcessError,
};

use super::ChipSet;

impl ChipOpcodes for ChipSet {
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match *opcode {
            System::Clear => {
                // 00E0
                self.display.clear();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            System::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.registers.pop_stack()?;
                log::debug!("return to {:#05X}", pc);
                Ok((ProgramCounterStep::Jump(pc as usize), Operation::None))
            }
            System::Routine(nnn) => {
                // 0NNN
                log::warn!("Ignoring machine code routine at {:#05X}", nnn);
                Ok((ProgramCounterStep::Next, Operation::None))
            }
        }
    }

    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize))
    }

    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // the return address is the opcode after the call
        let next = ProgramCounterStep::Next.apply(self.registers.pc as usize);
        self.registers.push_stack(next as u16)?;
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize))
    }

    fn skip_if_equal(&self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterByte { x, kk } = *opcode;
        Ok(ProgramCounterStep::cond(self.registers.v[x] == kk))
    }

    fn skip_if_not_equal(
        &self,
        opcode: &RegisterByte,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterByte { x, kk } = *opcode;
        Ok(ProgramCounterStep::cond(self.registers.v[x] != kk))
    }

    fn skip_if_registers_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterPair { x, y } = *opcode;
        Ok(ProgramCounterStep::cond(
            self.registers.v[x] == self.registers.v[y],
        ))
    }

    fn load(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterByte { x, kk } = *opcode;
        self.registers.v[x] = kk;
        Ok(ProgramCounterStep::Next)
    }

    fn add(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterByte { x, kk } = *opcode;
        // let VX overflow, but ignore carry
        self.registers.v[x] = self.registers.v[x].wrapping_add(kk);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError> {
        let Arithmetic { op, x, y } = *opcode;
        let v = &mut self.registers.v;
        let (vx, vy) = (v[x], v[y]);

        // the flag is always written last, so that VF as an operand
        // gets overwritten by the flag
        let flag = match op {
            ArithmeticOp::Assign => {
                v[x] = vy;
                None
            }
            ArithmeticOp::Or => {
                v[x] = vx | vy;
                None
            }
            ArithmeticOp::And => {
                v[x] = vx & vy;
                None
            }
            ArithmeticOp::Xor => {
                v[x] = vx ^ vy;
                None
            }
            ArithmeticOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                v[x] = res;
                Some(carry)
            }
            ArithmeticOp::Sub => {
                v[x] = vx.wrapping_sub(vy);
                Some(vx >= vy)
            }
            ArithmeticOp::ShiftRight => {
                v[x] = vx >> 1;
                Some(vx & 0x01 == 0x01)
            }
            ArithmeticOp::SubReverse => {
                // the result lands in VY
                v[y] = vy.wrapping_sub(vx);
                Some(vy >= vx)
            }
            ArithmeticOp::ShiftLeft => {
                v[x] = vx << 1;
                Some(vx & 0x80 == 0x80)
            }
        };

        if let Some(flag) = flag {
            self.registers.set_flag(flag);
        }
        Ok(ProgramCounterStep::Next)
    }

    fn skip_if_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterPair { x, y } = *opcode;
        Ok(ProgramCounterStep::cond(
            self.registers.v[x] != self.registers.v[y],
        ))
    }

    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        self.registers.i = opcode.nnn;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        let v0 = self.registers.v[0] as usize;
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize + v0))
    }

    fn random(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        let RegisterByte { x, kk } = *opcode;
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.rng.fill_bytes(&mut rand);
        self.registers.v[x] = kk & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let Sprite { x, y, n } = *opcode;
        let sprite = self.memory.read(self.registers.i as usize, n as usize)?;

        let collision = self.display.draw_sprite(self.registers.v[x], self.registers.v[y], sprite);
        self.registers.set_flag(collision);

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, ProcessError> {
        let Key { op, x } = *opcode;
        let pressed = self.keyboard.is_pressed(self.registers.v[x] as usize);
        let step = match op {
            KeyOp::Pressed => ProgramCounterStep::cond(pressed),
            KeyOp::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let Misc { op, x } = *opcode;
        let index = self.registers.i as usize;

        match op {
            MiscOp::GetDelayTimer => {
                self.registers.v[x] = self.registers.dt;
            }
            MiscOp::AwaitKeyPress => {
                // nothing moves until the caller saw a key press and runs
                // this opcode again
                match self.keyboard.first_pressed() {
                    Some(key) => self.registers.v[x] = key as u8,
                    None => return Ok((ProgramCounterStep::None, Operation::Wait)),
                }
            }
            MiscOp::SetDelayTimer => {
                self.registers.dt = self.registers.v[x];
            }
            MiscOp::SetSoundTimer => {
                self.registers.st = self.registers.v[x];
            }
            MiscOp::AddVxToI => {
                self.registers.i = self.registers.i.wrapping_add(self.registers.v[x] as u16);
            }
            MiscOp::SetIToSprite => {
                let digit = self.registers.v[x];
                if digit > fontset::LAST_DIGIT {
                    return Err(ProcessError::Calculation(format!(
                        "There is no glyph for {:#04X} in register V{:X}",
                        digit, x
                    )));
                }
                let glyph = fontset::LOCATION + fontset::GLYPH_SIZE * digit as usize;
                self.registers.i = glyph as u16;
            }
            MiscOp::StoreBCD => {
                let r = self.registers.v[x];
                // 246u8 / 100 => 2, 246u8 / 10 => 24 % 10 => 4, 246u8 % 10 => 6
                self.memory.write(index, &[r / 100, r / 10 % 10, r % 10])?;
            }
            MiscOp::StoreV0ToVx => {
                self.memory.write(index, &self.registers.v[..=x])?;
            }
            MiscOp::FillV0ToVx => {
                let data = self.memory.read(index, x + 1)?;
                self.registers.v[..=x].copy_from_slice(data);
            }
        }
        Ok((ProgramCounterStep::Next, Operation::None))
    }
}
