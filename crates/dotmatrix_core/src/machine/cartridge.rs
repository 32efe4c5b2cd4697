//! Cartridge seam: the bus routes the ROM and external-RAM windows through
//! this trait so hosts can plug in mapper implementations without touching
//! the core.

/// Program/data source mapped at 0x0000-0x7FFF (ROM window) and
/// 0xA000-0xBFFF (external RAM window).
///
/// Addresses are the absolute bus addresses; implementations translate
/// banking themselves. `rom_write` exists because mappers use ROM-window
/// writes as bank-switch commands.
pub trait Cartridge {
    fn rom_read(&self, addr: u16) -> u8;
    fn rom_write(&mut self, addr: u16, value: u8);
    fn ram_read(&self, addr: u16) -> u8;
    fn ram_write(&mut self, addr: u16, value: u8);

    /// Persist battery-backed RAM. Called when emulation stops.
    fn flush(&mut self) {}
}

/// Unbanked cartridge: up to 32 KiB of ROM mapped flat, plus a fixed 8 KiB
/// RAM bank. Covers mapper-less ROMs and is the default test fixture.
pub struct FlatCartridge {
    rom: Vec<u8>,
    ram: [u8; 0x2000],
}

impl FlatCartridge {
    pub fn new(rom: Vec<u8>) -> Self {
        if rom.len() > 0x8000 {
            log::warn!(
                "flat cartridge image is {} bytes; only the first 32 KiB are mapped",
                rom.len()
            );
        }
        Self {
            rom,
            ram: [0; 0x2000],
        }
    }

    /// All-zero ROM; reads execute as NOPs.
    pub fn empty() -> Self {
        Self::new(vec![0; 0x8000])
    }
}

impl Cartridge for FlatCartridge {
    fn rom_read(&self, addr: u16) -> u8 {
        // Open bus beyond the image.
        self.rom.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn rom_write(&mut self, _addr: u16, _value: u8) {
        // No mapper; bank-switch commands go nowhere.
    }

    fn ram_read(&self, addr: u16) -> u8 {
        self.ram[(addr as usize - 0xA000) % self.ram.len()]
    }

    fn ram_write(&mut self, addr: u16, value: u8) {
        self.ram[(addr as usize - 0xA000) % self.ram.len()] = value;
    }
}
