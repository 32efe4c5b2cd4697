use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(in crate::cpu) fn exec_ld_rr_d16<B: Bus>(&mut self, bus: &mut B, rp: u8) -> u32 {
        let value = self.fetch16(bus);
        match rp {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            3 => self.regs.sp = value,
            _ => unreachable!(),
        }

        12
    }

    pub(in crate::cpu) fn exec_ld_r_d8<B: Bus>(&mut self, bus: &mut B, reg: u8) -> u32 {
        let value = self.fetch8(bus);
        self.write_reg8(bus, reg, value);

        if reg == 6 { 12 } else { 8 }
    }

    /// LD r1,r2 over the 0x40-0x7F block (0x76/HALT is dispatched
    /// separately).
    pub(in crate::cpu) fn exec_ld_r_r<B: Bus>(&mut self, bus: &mut B, dst: u8, src: u8) -> u32 {
        let value = self.read_reg8(bus, src);
        self.write_reg8(bus, dst, value);

        if dst == 6 || src == 6 { 8 } else { 4 }
    }

    pub(in crate::cpu) fn exec_ld_a16_sp<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch16(bus);
        let sp = self.regs.sp;
        bus.write8(addr, sp as u8);
        bus.write8(addr.wrapping_add(1), (sp >> 8) as u8);
        20
    }

    pub(in crate::cpu) fn exec_store_high_a8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch8(bus) as u16;
        bus.write8(0xFF00u16.wrapping_add(offset), self.regs.a);
        12
    }

    pub(in crate::cpu) fn exec_load_high_a8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch8(bus) as u16;
        self.regs.a = bus.read8(0xFF00u16.wrapping_add(offset));
        12
    }

    pub(in crate::cpu) fn exec_store_high_c<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = 0xFF00u16.wrapping_add(self.regs.c as u16);
        bus.write8(addr, self.regs.a);
        8
    }

    pub(in crate::cpu) fn exec_load_high_c<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = 0xFF00u16.wrapping_add(self.regs.c as u16);
        self.regs.a = bus.read8(addr);
        8
    }

    pub(in crate::cpu) fn exec_store_a16<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch16(bus);
        bus.write8(addr, self.regs.a);
        16
    }

    pub(in crate::cpu) fn exec_load_a16<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch16(bus);
        self.regs.a = bus.read8(addr);
        16
    }

    /// Indirect address for LD (rr),A / LD A,(rr); rp 2 and 3 are the
    /// post-increment/post-decrement HL forms.
    fn indirect_addr(&mut self, rp: u8) -> u16 {
        match rp {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let addr = self.regs.hl();
                self.regs.set_hl(addr.wrapping_add(1));
                addr
            }
            3 => {
                let addr = self.regs.hl();
                self.regs.set_hl(addr.wrapping_sub(1));
                addr
            }
            _ => unreachable!(),
        }
    }

    pub(in crate::cpu) fn exec_store_a_indirect<B: Bus>(&mut self, bus: &mut B, rp: u8) -> u32 {
        let addr = self.indirect_addr(rp);
        bus.write8(addr, self.regs.a);
        8
    }

    pub(in crate::cpu) fn exec_load_a_indirect<B: Bus>(&mut self, bus: &mut B, rp: u8) -> u32 {
        let addr = self.indirect_addr(rp);
        self.regs.a = bus.read8(addr);
        8
    }

    pub(in crate::cpu) fn exec_ld_sp_hl(&mut self) -> u32 {
        self.regs.sp = self.regs.hl();
        8
    }

    pub(in crate::cpu) fn exec_ld_hl_sp_r8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let imm8 = self.fetch8(bus);
        let result = self.alu_add16_signed(self.regs.sp, imm8);
        self.regs.set_hl(result);
        12
    }

    pub(in crate::cpu) fn exec_add_sp_r8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let imm8 = self.fetch8(bus);
        self.regs.sp = self.alu_add16_signed(self.regs.sp, imm8);
        16
    }
}
