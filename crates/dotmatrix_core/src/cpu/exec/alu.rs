use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    fn alu_apply(&mut self, op: u8, value: u8) {
        match op {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            7 => self.alu_cp(value),
            _ => unreachable!(),
        }
    }

    pub(in crate::cpu) fn exec_alu_reg<B: Bus>(&mut self, bus: &mut B, op: u8, src: u8) -> u32 {
        let value = self.read_reg8(bus, src);
        self.alu_apply(op, value);

        if src == 6 { 8 } else { 4 }
    }

    pub(in crate::cpu) fn exec_alu_imm<B: Bus>(&mut self, bus: &mut B, op: u8) -> u32 {
        let value = self.fetch8(bus);
        self.alu_apply(op, value);

        8
    }

    /// Unprefixed accumulator rotates (RLCA/RRCA/RLA/RRA).
    ///
    /// Unlike the CB-prefixed rotate family, these never set Z; all four
    /// clear Z, N and H and set C from the bit shifted out.
    pub(in crate::cpu) fn exec_rotate_a(&mut self, which: u8) -> u32 {
        let a = self.regs.a;
        let (result, carry) = match which {
            // RLCA
            0 => (a.rotate_left(1), (a & 0x80) != 0),
            // RRCA
            1 => (a.rotate_right(1), (a & 0x01) != 0),
            // RLA
            2 => {
                let carry_in = if self.get_flag(Flag::C) { 1 } else { 0 };
                ((a << 1) | carry_in, (a & 0x80) != 0)
            }
            // RRA
            3 => {
                let carry_in = if self.get_flag(Flag::C) { 0x80 } else { 0 };
                ((a >> 1) | carry_in, (a & 0x01) != 0)
            }
            _ => unreachable!(),
        };

        self.regs.a = result;
        self.clear_flags();
        self.set_flag(Flag::C, carry);
        4
    }

    pub(in crate::cpu) fn exec_daa(&mut self) -> u32 {
        self.alu_daa();
        4
    }

    pub(in crate::cpu) fn exec_cpl(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
        4
    }

    pub(in crate::cpu) fn exec_scf(&mut self) -> u32 {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
        4
    }

    pub(in crate::cpu) fn exec_ccf(&mut self) -> u32 {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
        4
    }
}
