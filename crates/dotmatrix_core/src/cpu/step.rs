use crate::error::CoreError;
use crate::interrupts::Interrupt;
use crate::TICKS_PER_STEP;

use super::{Bus, Cpu};

/// I/O addresses of the interrupt request and enable registers.
const IO_IF: u16 = 0xFF0F;
const IO_IE: u16 = 0xFFFF;

/// Fixed cost of an interrupt dispatch, in elementary ticks.
///
/// Hardware references disagree between 20 and 24 here; this core commits
/// to 20 (5 quanta).
const INTERRUPT_SERVICE_TICKS: u32 = 20;

impl Cpu {
    /// Advance the CPU by one machine quantum (4 elementary ticks).
    ///
    /// The wait counter loaded from the previous instruction's cost is
    /// consumed first; once it reaches zero the CPU samples interrupts,
    /// then either idles (Halted with nothing pending), services a pending
    /// interrupt, or fetches and executes the next instruction and reloads
    /// the counter.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), CoreError> {
        if self.wait_quanta > 0 {
            self.wait_quanta -= 1;
            return Ok(());
        }

        let was_halted = self.halted;

        if let Some(ticks) = self.service_interrupts(bus) {
            self.wait_quanta = ticks / TICKS_PER_STEP - 1;
            return Ok(());
        }

        if self.halted {
            // Nothing pending: burn one quantum without fetching.
            return Ok(());
        }

        if was_halted {
            // Woken without service (IME clear). Leaving the halted state
            // consumes this quantum; fetching resumes on the next one.
            return Ok(());
        }

        let pc = self.regs.pc;
        let opcode = self.fetch8(bus);
        let ticks = self.exec_opcode(bus, pc, opcode)?;
        self.tick_ime_delay();

        debug_assert!(
            ticks >= TICKS_PER_STEP && ticks % TICKS_PER_STEP == 0,
            "instruction cost must be a positive multiple of the quantum"
        );
        self.wait_quanta = ticks / TICKS_PER_STEP - 1;
        Ok(())
    }

    /// Sample the interrupt controller through the bus, in fixed priority
    /// order VBlank > LCD-status > Timer > Serial > Joypad.
    ///
    /// Any source with request and enable both set wakes the CPU from
    /// HALT, regardless of IME. If IME is additionally set, the single
    /// highest-priority source fires: its request bit is cleared, IME is
    /// cleared, PC is pushed (high byte first) and execution jumps to the
    /// source's vector. Returns the dispatch cost when a source fired.
    fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let enable = bus.read8(IO_IE);
        let request = bus.read8(IO_IF);
        let pending = enable & request & 0x1F;
        if pending == 0 {
            return None;
        }

        self.halted = false;

        if !self.ime {
            return None;
        }

        let source = Interrupt::from_index(pending.trailing_zeros() as u8)?;

        self.ime = false;
        self.ime_enable_delay = 0;
        bus.write8(IO_IF, request & !source.mask());

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = source.vector();

        log::debug!(
            "interrupt dispatch: {source:?} vector=0x{vector:04X} pc=0x{pc:04X} sp=0x{sp:04X}",
            vector = source.vector(),
            sp = self.regs.sp,
        );

        Some(INTERRUPT_SERVICE_TICKS)
    }

    /// Apply the delayed IME change requested by EI. Called once at the end
    /// of every executed instruction.
    #[inline]
    fn tick_ime_delay(&mut self) {
        match self.ime_enable_delay {
            2 => self.ime_enable_delay = 1,
            1 => {
                self.ime_enable_delay = 0;
                self.ime = true;
            }
            _ => {}
        }
    }
}
