use super::decode::{CbOp, PREFIXED};
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Handle CB-prefixed instructions (bit operations, shifts, and
    /// rotates) by indexing the prefixed dispatch table.
    ///
    /// Unlike the unprefixed accumulator rotates, every operation in the
    /// rotate/shift family here sets Z from its result.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch8(bus);

        match PREFIXED[cb as usize] {
            CbOp::Rotate { kind, target } => {
                let mut value = self.read_reg8(bus, target);

                match kind {
                    // RLC r
                    0 => {
                        let carry = (value & 0x80) != 0;
                        value = value.rotate_left(1);
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry);
                    }
                    // RRC r
                    1 => {
                        let carry = (value & 0x01) != 0;
                        value = value.rotate_right(1);
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry);
                    }
                    // RL r
                    2 => {
                        let carry_out = (value & 0x80) != 0;
                        let carry_in = if self.get_flag(Flag::C) { 1 } else { 0 };
                        value = (value << 1) | carry_in;
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry_out);
                    }
                    // RR r
                    3 => {
                        let carry_out = (value & 0x01) != 0;
                        let carry_in = if self.get_flag(Flag::C) { 0x80 } else { 0 };
                        value = (value >> 1) | carry_in;
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry_out);
                    }
                    // SLA r
                    4 => {
                        let carry = (value & 0x80) != 0;
                        value <<= 1;
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry);
                    }
                    // SRA r
                    5 => {
                        let carry = (value & 0x01) != 0;
                        let msb = value & 0x80;
                        value = (value >> 1) | msb;
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry);
                    }
                    // SWAP r
                    6 => {
                        value = (value << 4) | (value >> 4);
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                    }
                    // SRL r
                    7 => {
                        let carry = (value & 0x01) != 0;
                        value >>= 1;
                        self.clear_flags();
                        self.set_flag(Flag::Z, value == 0);
                        self.set_flag(Flag::C, carry);
                    }
                    _ => unreachable!(),
                }

                self.write_reg8(bus, target, value);
                if target == 6 { 16 } else { 8 }
            }
            CbOp::Bit { bit, target } => {
                let value = self.read_reg8(bus, target);
                let bit_set = (value & (1 << bit)) != 0;
                // Preserve C, set H=1, N=0.
                let carry = self.get_flag(Flag::C);
                self.clear_flags();
                self.set_flag(Flag::Z, !bit_set);
                self.set_flag(Flag::H, true);
                self.set_flag(Flag::C, carry);

                if target == 6 { 12 } else { 8 }
            }
            CbOp::Res { bit, target } => {
                let mut value = self.read_reg8(bus, target);
                value &= !(1 << bit);
                self.write_reg8(bus, target, value);

                if target == 6 { 16 } else { 8 }
            }
            CbOp::Set { bit, target } => {
                let mut value = self.read_reg8(bus, target);
                value |= 1 << bit;
                self.write_reg8(bus, target, value);

                if target == 6 { 16 } else { 8 }
            }
        }
    }
}
