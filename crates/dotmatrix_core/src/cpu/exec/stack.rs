use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(in crate::cpu) fn exec_push_rr<B: Bus>(&mut self, bus: &mut B, rp2: u8) -> u32 {
        let value = match rp2 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            3 => self.regs.af(),
            _ => unreachable!(),
        };

        self.push_u16(bus, value);
        16
    }

    pub(in crate::cpu) fn exec_pop_rr<B: Bus>(&mut self, bus: &mut B, rp2: u8) -> u32 {
        let value = self.pop_u16(bus);
        match rp2 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            // POP AF masks the low nibble of F through set_af.
            3 => self.regs.set_af(value),
            _ => unreachable!(),
        }

        12
    }

    pub(in crate::cpu) fn exec_rst<B: Bus>(&mut self, bus: &mut B, target: u8) -> u32 {
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = target as u16;
        16
    }

    pub(in crate::cpu) fn exec_call_a16<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch16(bus);
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = addr;
        24
    }

    pub(in crate::cpu) fn exec_ret<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.pop_u16(bus);
        self.regs.pc = addr;
        16
    }

    /// RETI: return and enable interrupts immediately (no EI-style delay).
    pub(in crate::cpu) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.pop_u16(bus);
        self.regs.pc = addr;
        self.ime = true;
        16
    }
}
