use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    #[inline]
    fn cc_condition(&self, cc: u8) -> bool {
        match cc {
            0 => !self.get_flag(Flag::Z), // NZ
            1 => self.get_flag(Flag::Z),  // Z
            2 => !self.get_flag(Flag::C), // NC
            3 => self.get_flag(Flag::C),  // C
            _ => false,
        }
    }

    pub(in crate::cpu) fn exec_jr_cc<B: Bus>(&mut self, bus: &mut B, cc: u8) -> u32 {
        self.jr(bus, self.cc_condition(cc))
    }

    pub(in crate::cpu) fn exec_jp_cc<B: Bus>(&mut self, bus: &mut B, cc: u8) -> u32 {
        self.jp_cond(bus, self.cc_condition(cc))
    }

    pub(in crate::cpu) fn exec_jp_a16<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch16(bus);
        self.regs.pc = addr;
        16
    }

    pub(in crate::cpu) fn exec_jp_hl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(in crate::cpu) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, cc: u8) -> u32 {
        self.call_cond(bus, self.cc_condition(cc))
    }

    pub(in crate::cpu) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, cc: u8) -> u32 {
        self.ret_cond(bus, self.cc_condition(cc))
    }
}
