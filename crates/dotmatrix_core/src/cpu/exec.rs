mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use crate::error::CoreError;

use super::decode::{Op, PRIMARY};
use super::{Bus, Cpu};

impl Cpu {
    /// Execute a single decoded opcode and return its cost in elementary
    /// ticks.
    ///
    /// `pc` is the address the opcode byte was fetched from; it is only
    /// used to report an undecodable opcode, which is a fatal condition.
    pub(super) fn exec_opcode<B: Bus>(
        &mut self,
        bus: &mut B,
        pc: u16,
        opcode: u8,
    ) -> Result<u32, CoreError> {
        let cycles = match PRIMARY[opcode as usize] {
            Op::Nop => 4,
            Op::Stop => self.exec_stop(bus),
            Op::Halt => self.exec_halt(),
            Op::Di => self.exec_di(),
            Op::Ei => self.exec_ei(),
            Op::Prefix => self.exec_cb(bus),

            Op::LdRrD16(rp) => self.exec_ld_rr_d16(bus, rp),
            Op::LdRD8(reg) => self.exec_ld_r_d8(bus, reg),
            Op::LdRR { dst, src } => self.exec_ld_r_r(bus, dst, src),
            Op::StoreAIndirect(rp) => self.exec_store_a_indirect(bus, rp),
            Op::LoadAIndirect(rp) => self.exec_load_a_indirect(bus, rp),
            Op::LdA16Sp => self.exec_ld_a16_sp(bus),
            Op::StoreHighA8 => self.exec_store_high_a8(bus),
            Op::LoadHighA8 => self.exec_load_high_a8(bus),
            Op::StoreHighC => self.exec_store_high_c(bus),
            Op::LoadHighC => self.exec_load_high_c(bus),
            Op::StoreA16 => self.exec_store_a16(bus),
            Op::LoadA16 => self.exec_load_a16(bus),
            Op::LdSpHl => self.exec_ld_sp_hl(),
            Op::LdHlSpR8 => self.exec_ld_hl_sp_r8(bus),
            Op::AddSpR8 => self.exec_add_sp_r8(bus),

            Op::Inc16(rp) => self.exec_inc16_rr(rp),
            Op::Dec16(rp) => self.exec_dec16_rr(rp),
            Op::Inc8(reg) => self.exec_inc8_reg(bus, reg),
            Op::Dec8(reg) => self.exec_dec8_reg(bus, reg),
            Op::AddHl(rp) => self.exec_add_hl_rr(rp),

            Op::AluReg { op, src } => self.exec_alu_reg(bus, op, src),
            Op::AluImm(op) => self.exec_alu_imm(bus, op),
            Op::RotateA(which) => self.exec_rotate_a(which),
            Op::Daa => self.exec_daa(),
            Op::Cpl => self.exec_cpl(),
            Op::Scf => self.exec_scf(),
            Op::Ccf => self.exec_ccf(),

            Op::Jr => self.jr(bus, true),
            Op::JrCc(cc) => self.exec_jr_cc(bus, cc),
            Op::JpA16 => self.exec_jp_a16(bus),
            Op::JpCc(cc) => self.exec_jp_cc(bus, cc),
            Op::JpHl => self.exec_jp_hl(),
            Op::CallA16 => self.exec_call_a16(bus),
            Op::CallCc(cc) => self.exec_call_cc(bus, cc),
            Op::Ret => self.exec_ret(bus),
            Op::RetCc(cc) => self.exec_ret_cc(bus, cc),
            Op::Reti => self.exec_reti(bus),
            Op::Rst(target) => self.exec_rst(bus, target),
            Op::Push(rp2) => self.exec_push_rr(bus, rp2),
            Op::Pop(rp2) => self.exec_pop_rr(bus, rp2),

            Op::Illegal => {
                log::error!(
                    "illegal opcode 0x{opcode:02X} at PC=0x{pc:04X} \
                     (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X})",
                    sp = self.regs.sp,
                    af = self.regs.af(),
                    bc = self.regs.bc(),
                    de = self.regs.de(),
                    hl = self.regs.hl(),
                );
                return Err(CoreError::IllegalOpcode { pc, opcode });
            }
        };

        Ok(cycles)
    }
}
