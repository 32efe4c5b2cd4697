use crate::machine::Model;

use super::{Cpu, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new(Model::Dmg)
    }
}

impl Cpu {
    /// Create a CPU in the post-boot register state for the given hardware
    /// profile.
    ///
    /// The profile is a runtime value selected once at construction; one
    /// build supports both register patterns.
    pub fn new(model: Model) -> Self {
        let mut cpu = Self::power_on();
        cpu.apply_boot_state(model);
        cpu
    }

    /// Create a CPU with every register zeroed.
    ///
    /// Intended for hosts that map a boot program at 0x0000; the boot code
    /// is then responsible for populating the registers before handing
    /// control to cartridge code.
    pub fn power_on() -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            ime_enable_delay: 0,
            wait_quanta: 0,
        }
    }

    /// Reset to the post-boot state for `model`.
    pub fn reset(&mut self, model: Model) {
        *self = Self::new(model);
    }

    /// Initialize registers to match the boot ROM's state at the moment it
    /// hands control to cartridge code at 0x0100.
    ///
    /// Values per Pan Docs "Power Up State"; IME is clear at this point and
    /// the cartridge enables interrupts itself via EI/RETI.
    fn apply_boot_state(&mut self, model: Model) {
        match model {
            Model::Dmg => {
                self.regs.a = 0x01;
                self.regs.f = 0xB0;
                self.regs.b = 0x00;
                self.regs.c = 0x13;
                self.regs.d = 0x00;
                self.regs.e = 0xD8;
                self.regs.h = 0x01;
                self.regs.l = 0x4D;
            }
            Model::Cgb => {
                self.regs.a = 0x11;
                self.regs.f = 0x80;
                self.regs.b = 0x00;
                self.regs.c = 0x00;
                self.regs.d = 0x00;
                self.regs.e = 0x08;
                self.regs.h = 0x00;
                self.regs.l = 0x7C;
            }
        }
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }
}
