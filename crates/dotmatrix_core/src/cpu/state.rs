use crate::error::CoreError;
use crate::state::{check_len, FieldReader, SaveState};

use super::Cpu;

/// 8 register bytes + SP + PC + ime + halted + EI delay + wait counter.
const CPU_STATE_LEN: usize = 8 + 2 + 2 + 1 + 1 + 1 + 4;

impl SaveState for Cpu {
    fn state_len(&self) -> usize {
        CPU_STATE_LEN
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[
            self.regs.a,
            self.regs.f,
            self.regs.b,
            self.regs.c,
            self.regs.d,
            self.regs.e,
            self.regs.h,
            self.regs.l,
        ]);
        out.extend_from_slice(&self.regs.sp.to_le_bytes());
        out.extend_from_slice(&self.regs.pc.to_le_bytes());
        out.push(self.ime as u8);
        out.push(self.halted as u8);
        out.push(self.ime_enable_delay);
        out.extend_from_slice(&self.wait_quanta.to_le_bytes());
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError> {
        check_len(CPU_STATE_LEN, data)?;

        let mut reader = FieldReader::new(data);
        self.regs.a = reader.u8();
        self.regs.f = reader.u8() & 0xF0;
        self.regs.b = reader.u8();
        self.regs.c = reader.u8();
        self.regs.d = reader.u8();
        self.regs.e = reader.u8();
        self.regs.h = reader.u8();
        self.regs.l = reader.u8();
        self.regs.sp = reader.u16();
        self.regs.pc = reader.u16();
        self.ime = reader.u8() != 0;
        self.halted = reader.u8() != 0;
        self.ime_enable_delay = reader.u8();
        self.wait_quanta = reader.u32();
        Ok(())
    }
}
