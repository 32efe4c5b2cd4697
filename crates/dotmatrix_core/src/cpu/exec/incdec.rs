use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(in crate::cpu) fn exec_inc8_reg<B: Bus>(&mut self, bus: &mut B, reg: u8) -> u32 {
        let value = self.read_reg8(bus, reg);
        let result = self.alu_inc8(value);
        self.write_reg8(bus, reg, result);

        if reg == 6 { 12 } else { 4 }
    }

    pub(in crate::cpu) fn exec_dec8_reg<B: Bus>(&mut self, bus: &mut B, reg: u8) -> u32 {
        let value = self.read_reg8(bus, reg);
        let result = self.alu_dec8(value);
        self.write_reg8(bus, reg, result);

        if reg == 6 { 12 } else { 4 }
    }

    /// 16-bit INC rr. Flags are untouched.
    pub(in crate::cpu) fn exec_inc16_rr(&mut self, rp: u8) -> u32 {
        match rp {
            0 => {
                let value = self.regs.bc().wrapping_add(1);
                self.regs.set_bc(value);
            }
            1 => {
                let value = self.regs.de().wrapping_add(1);
                self.regs.set_de(value);
            }
            2 => {
                let value = self.regs.hl().wrapping_add(1);
                self.regs.set_hl(value);
            }
            3 => {
                self.regs.sp = self.regs.sp.wrapping_add(1);
            }
            _ => unreachable!(),
        }
        8
    }

    /// 16-bit DEC rr. Flags are untouched.
    pub(in crate::cpu) fn exec_dec16_rr(&mut self, rp: u8) -> u32 {
        match rp {
            0 => {
                let value = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(value);
            }
            1 => {
                let value = self.regs.de().wrapping_sub(1);
                self.regs.set_de(value);
            }
            2 => {
                let value = self.regs.hl().wrapping_sub(1);
                self.regs.set_hl(value);
            }
            3 => {
                self.regs.sp = self.regs.sp.wrapping_sub(1);
            }
            _ => unreachable!(),
        }
        8
    }

    pub(in crate::cpu) fn exec_add_hl_rr(&mut self, rp: u8) -> u32 {
        let value = match rp {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            3 => self.regs.sp,
            _ => unreachable!(),
        };
        self.alu_add16_hl(value);
        8
    }
}
