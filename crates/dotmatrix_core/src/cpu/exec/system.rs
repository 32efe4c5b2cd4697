use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// HALT: idle until any interrupt source has both its request and
    /// enable bits set. The wake condition is independent of IME; with IME
    /// clear the CPU resumes fetching without servicing anything.
    pub(in crate::cpu) fn exec_halt(&mut self) -> u32 {
        self.halted = true;
        4
    }

    /// STOP is a 2-byte instruction; the padding byte is fetched and
    /// discarded so PC matches hardware. The deeper low-power state is not
    /// modelled separately: the CPU simply enters the Halted state and
    /// wakes on the usual interrupt condition.
    pub(in crate::cpu) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        self.halted = true;
        4
    }

    /// DI takes effect immediately and cancels any in-flight EI delay.
    pub(in crate::cpu) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_delay = 0;
        4
    }

    /// EI: IME becomes 1 only after the *next* instruction completes. The
    /// pending counter starts at 2 because the tick at the end of EI itself
    /// consumes one step.
    pub(in crate::cpu) fn exec_ei(&mut self) -> u32 {
        self.ime_enable_delay = 2;
        4
    }
}
