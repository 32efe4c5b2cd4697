//! Interrupt controller: five request/enable bit pairs and priority-ordered
//! dispatch metadata.
//!
//! The controller only holds state; the CPU performs the actual dispatch
//! sequence (IF-bit clear, IME clear, PC push, vector jump) once per step.
//! Collaborators raise requests through [`InterruptController::request`]:
//! the PPU for VBlank/LCD-status, and the out-of-scope timer/serial/joypad
//! peripherals for the remaining three sources.

use crate::error::CoreError;
use crate::state::{check_len, SaveState};

/// Bit masks for the I/O register views of IF/IE.
const SOURCE_MASK: u8 = 0x1F;
/// Unimplemented IF bits read back as 1, matching hardware.
const IF_UNUSED: u8 = 0xE0;

/// One maskable interrupt source, in fixed priority order (VBlank highest).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    /// Fixed program-counter value this source jumps to when serviced.
    #[inline]
    pub fn vector(self) -> u16 {
        0x0040 + (self as u16) * 8
    }

    #[inline]
    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub(crate) fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Interrupt::VBlank),
            1 => Some(Interrupt::LcdStat),
            2 => Some(Interrupt::Timer),
            3 => Some(Interrupt::Serial),
            4 => Some(Interrupt::Joypad),
            _ => None,
        }
    }
}

/// The five (request, enable) bit pairs backing the IF and IE registers.
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    pub(crate) request: u8,
    pub(crate) enable: u8,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the request bit for `source`. Called by peripherals; the bit
    /// stays set until the CPU services the source or software clears it
    /// through the IF register.
    #[inline]
    pub fn request(&mut self, source: Interrupt) {
        self.request |= source.mask();
    }

    /// True when any source has both its request and enable bits set.
    ///
    /// This is the HALT wake condition; it is independent of the CPU's
    /// master enable flag.
    #[inline]
    pub fn pending(&self) -> bool {
        (self.request & self.enable & SOURCE_MASK) != 0
    }

    /// Highest-priority source with request and enable both set.
    pub fn highest_pending(&self) -> Option<Interrupt> {
        let pending = self.request & self.enable & SOURCE_MASK;
        if pending == 0 {
            return None;
        }
        Interrupt::from_index(pending.trailing_zeros() as u8)
    }

    /// IF register read (0xFF0F). Unused high bits read as 1.
    #[inline]
    pub fn read_flags(&self) -> u8 {
        IF_UNUSED | (self.request & SOURCE_MASK)
    }

    /// IF register write (0xFF0F).
    #[inline]
    pub fn write_flags(&mut self, value: u8) {
        self.request = value & SOURCE_MASK;
    }

    /// IE register read (0xFFFF). All eight bits are writable on hardware
    /// and read back as written; only the low five participate in dispatch.
    #[inline]
    pub fn read_enable(&self) -> u8 {
        self.enable
    }

    /// IE register write (0xFFFF).
    #[inline]
    pub fn write_enable(&mut self, value: u8) {
        self.enable = value;
    }
}

impl SaveState for InterruptController {
    fn state_len(&self) -> usize {
        2
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        out.push(self.request);
        out.push(self.enable);
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError> {
        check_len(2, data)?;
        self.request = data[0] & SOURCE_MASK;
        self.enable = data[1];
        Ok(())
    }
}
