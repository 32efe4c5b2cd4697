//! System bus: the full 16-bit address decoder tying the CPU to the
//! cartridge, work RAM, the PPU's gated memories and the I/O registers.

use crate::cpu::Bus;
use crate::error::CoreError;
use crate::interrupts::InterruptController;
use crate::machine::cartridge::{Cartridge, FlatCartridge};
use crate::ppu::Ppu;
use crate::state::{check_len, FieldReader, SaveState};

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;
const IO_SIZE: usize = 0x80;

const IO_IF: u16 = 0xFF0F;
const IO_IE: u16 = 0xFFFF;
/// OAM DMA trigger. Inside the display register range but owned by the
/// out-of-scope DMA engine, so it falls through to inert storage.
const IO_DMA: u16 = 0xFF46;

pub struct SystemBus {
    pub ppu: Ppu,
    pub interrupts: InterruptController,
    cartridge: Box<dyn Cartridge>,
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    /// Backing bytes for I/O registers without an implemented peripheral
    /// (timer, serial, joypad, audio, DMA). They hold written values so
    /// software that polls its own configuration still works.
    io: [u8; IO_SIZE],
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new(Box::new(FlatCartridge::empty()))
    }
}

impl SystemBus {
    pub fn new(cartridge: Box<dyn Cartridge>) -> Self {
        Self {
            ppu: Ppu::new(),
            interrupts: InterruptController::new(),
            cartridge,
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            io: [0; IO_SIZE],
        }
    }

    /// Swap in a new cartridge, flushing the old one first.
    pub fn set_cartridge(&mut self, cartridge: Box<dyn Cartridge>) {
        self.cartridge.flush();
        self.cartridge = cartridge;
    }

    pub fn flush_cartridge(&mut self) {
        self.cartridge.flush();
    }

    /// Advance every bus-side collaborator by one machine quantum.
    ///
    /// Runs before the CPU's slice of the same quantum, so interrupt
    /// requests raised here are visible to the CPU immediately. The
    /// timer/serial/joypad peripherals would tick first here; only the PPU
    /// is present.
    pub fn tick_quantum(&mut self) {
        self.ppu.step(&mut self.interrupts);
    }

    fn display_register(addr: u16) -> bool {
        (0xFF40..=0xFF4B).contains(&addr) && addr != IO_DMA
    }
}

impl Bus for SystemBus {
    fn read8(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.cartridge.rom_read(addr),
            0x8000..=0x9FFF => self.ppu.vram_read(addr),
            0xA000..=0xBFFF => self.cartridge.ram_read(addr),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            // Echo RAM mirrors 0xC000-0xDDFF.
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            0xFE00..=0xFE9F => self.ppu.oam_read(addr),
            // Unusable region.
            0xFEA0..=0xFEFF => 0xFF,
            IO_IF => self.interrupts.read_flags(),
            _ if Self::display_register(addr) => self.ppu.read_register(addr),
            0xFF00..=0xFF7F => self.io[(addr - 0xFF00) as usize],
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            IO_IE => self.interrupts.read_enable(),
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => self.cartridge.rom_write(addr, value),
            0x8000..=0x9FFF => self.ppu.vram_write(addr, value),
            0xA000..=0xBFFF => self.cartridge.ram_write(addr, value),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize] = value,
            0xFE00..=0xFE9F => self.ppu.oam_write(addr, value),
            0xFEA0..=0xFEFF => {}
            IO_IF => self.interrupts.write_flags(value),
            _ if Self::display_register(addr) => self.ppu.write_register(addr, value),
            0xFF00..=0xFF7F => self.io[(addr - 0xFF00) as usize] = value,
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = value,
            IO_IE => self.interrupts.write_enable(value),
        }
    }
}

/// WRAM + HRAM + inert I/O + interrupt pair + the PPU's own payload. The
/// cartridge is deliberately excluded; ROM images are host-provided and
/// mapper state belongs to the mapper implementation.
const BUS_FIXED_LEN: usize = WRAM_SIZE + HRAM_SIZE + IO_SIZE + 2;

impl SaveState for SystemBus {
    fn state_len(&self) -> usize {
        BUS_FIXED_LEN + self.ppu.state_len()
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.wram);
        out.extend_from_slice(&self.hram);
        out.extend_from_slice(&self.io);
        self.interrupts.save_state(out);
        self.ppu.save_state(out);
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError> {
        check_len(self.state_len(), data)?;

        let mut reader = FieldReader::new(data);
        self.wram.copy_from_slice(reader.bytes(WRAM_SIZE));
        self.hram.copy_from_slice(reader.bytes(HRAM_SIZE));
        self.io.copy_from_slice(reader.bytes(IO_SIZE));
        self.interrupts.load_state(reader.bytes(2))?;
        self.ppu.load_state(reader.rest())
    }
}
