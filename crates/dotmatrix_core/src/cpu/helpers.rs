use super::{Bus, Cpu};

impl Cpu {
    /// Read an 8-bit register or (HL) by table index
    /// (0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A).
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, index: u8) -> u8 {
        match index {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => bus.read8(self.regs.hl()),
            7 => self.regs.a,
            _ => 0,
        }
    }

    /// Write an 8-bit register or (HL) by table index.
    ///
    /// The encoding matches `read_reg8`.
    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, index: u8, value: u8) {
        match index {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => bus.write8(self.regs.hl(), value),
            7 => self.regs.a = value,
            _ => {}
        }
    }

    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus) as u16;
        let hi = self.fetch8(bus) as u16;
        (hi << 8) | lo
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let lo = value as u8;
        let hi = (value >> 8) as u8;
        // Stack grows downward: memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp) as u16;
        let hi = bus.read8(self.regs.sp.wrapping_add(1)) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(2);
        (hi << 8) | lo
    }

    /// Relative jump helper used by JR/JR cc.
    ///
    /// The displacement is a signed 8-bit offset relative to the address
    /// following the operand.
    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let offset = self.fetch8(bus) as i8;
        if cond {
            // Sign-extend and add with wraparound; PC arithmetic is modulo
            // the 16-bit address space.
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
            12
        } else {
            8
        }
    }

    /// Absolute jump helper used by JP cc,a16.
    pub(super) fn jp_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let addr = self.fetch16(bus);
        if cond {
            self.regs.pc = addr;
            16
        } else {
            12
        }
    }

    /// Conditional call helper used by CALL cc,a16.
    pub(super) fn call_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        let addr = self.fetch16(bus);
        if cond {
            let ret = self.regs.pc;
            self.push_u16(bus, ret);
            self.regs.pc = addr;
            24
        } else {
            12
        }
    }

    /// Conditional return helper used by RET cc.
    pub(super) fn ret_cond<B: Bus>(&mut self, bus: &mut B, cond: bool) -> u32 {
        if cond {
            let addr = self.pop_u16(bus);
            self.regs.pc = addr;
            20
        } else {
            8
        }
    }
}
