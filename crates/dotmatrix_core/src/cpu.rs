/// Registers for the Game Boy CPU (LR35902).
///
/// The core is Z80-like with an 8-bit ALU and a 16-bit address space.
/// B/C, D/E, H/L and A/F are also addressable as four 16-bit pairs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f & 0xF0])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0-3 are always zero.
#[derive(Clone, Copy, Debug)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        let bit = flag as u8;
        (self.regs.f & (1 << bit)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let bit = flag as u8;
        if value {
            self.regs.f |= 1 << bit;
        } else {
            self.regs.f &= !(1 << bit);
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = 0;
    }
}

/// Narrow read/write capability over the memory bus.
///
/// The bus owner resolves each 16-bit address to cartridge, work RAM,
/// PPU-owned memory, I/O registers or high RAM. Region-level access
/// restrictions for PPU memory are enforced by the PPU behind this trait,
/// not by the CPU. The CPU never holds a back-reference to any peripheral;
/// this trait is the only seam it sees.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
}

/// Run state visible to hosts for status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

/// The CPU fetch-decode-execute engine.
///
/// `step` is invoked once per machine quantum (4 elementary ticks) and paces
/// itself with `wait_quanta`: after executing an instruction the counter is
/// loaded with the instruction's remaining cost, and subsequent steps only
/// decrement it. Interrupt sampling happens at instruction boundaries, when
/// the counter reaches zero.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// Master interrupt-enable flag (IME).
    pub ime: bool,
    pub(crate) halted: bool,
    /// One-instruction latency counter for EI: 2 immediately after EI
    /// executes, decremented at the end of every instruction; IME becomes
    /// true when it reaches zero.
    pub(crate) ime_enable_delay: u8,
    /// Remaining machine quanta before the next fetch.
    pub(crate) wait_quanta: u32,
}

impl Cpu {
    /// Run state query for UI status reporting.
    #[inline]
    pub fn run_state(&self) -> RunState {
        if self.halted {
            RunState::Halted
        } else {
            RunState::Running
        }
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

mod alu;
mod cb;
mod decode;
mod exec;
mod helpers;
mod init;
mod state;
mod step;

#[cfg(test)]
mod tests;
