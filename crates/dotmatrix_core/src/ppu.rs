//! Video display processor: a four-state scanline timer that renders one
//! scanline per OAMSearch->PixelTransfer transition and gates CPU access to
//! its own memory while busy.

use bitflags::bitflags;

use crate::error::CoreError;
use crate::interrupts::{Interrupt, InterruptController};
use crate::state::{check_len, FieldReader, SaveState};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH, TICKS_PER_STEP};

mod render;


pub(crate) const VRAM_SIZE: usize = 0x2000;
pub(crate) const OAM_SIZE: usize = 0xA0;
const OAM_ENTRIES: usize = 40;
const MAX_LINE_SPRITES: usize = 10;

// Display register addresses. 0xFF46 (OAM DMA trigger) sits inside this
// range but belongs to the out-of-scope DMA collaborator; the bus routes it
// elsewhere.
pub(crate) const IO_LCDC: u16 = 0xFF40;
pub(crate) const IO_STAT: u16 = 0xFF41;
pub(crate) const IO_SCY: u16 = 0xFF42;
pub(crate) const IO_SCX: u16 = 0xFF43;
pub(crate) const IO_LY: u16 = 0xFF44;
pub(crate) const IO_LYC: u16 = 0xFF45;
pub(crate) const IO_BGP: u16 = 0xFF47;
pub(crate) const IO_OBP0: u16 = 0xFF48;
pub(crate) const IO_OBP1: u16 = 0xFF49;
pub(crate) const IO_WY: u16 = 0xFF4A;
pub(crate) const IO_WX: u16 = 0xFF4B;

// Fixed mode durations in elementary ticks. One line is 456 ticks
// (80 + 172 + 204); a frame is 154 lines.
const OAM_SEARCH_TICKS: u32 = 80;
const PIXEL_TRANSFER_TICKS: u32 = 172;
const HBLANK_TICKS: u32 = 204;
const LINE_TICKS: u32 = 456;
const VISIBLE_LINES: u8 = 144;
const LAST_LINE: u8 = 153;

/// STAT interrupt-enable bits (as written by software).
const STAT_HBLANK_IRQ: u8 = 0x08;
const STAT_VBLANK_IRQ: u8 = 0x10;
const STAT_OAM_IRQ: u8 = 0x20;
const STAT_LYC_IRQ: u8 = 0x40;
const STAT_ENABLE_MASK: u8 = 0x78;

/// Value returned for reads the PPU refuses while busy.
const BLOCKED_READ: u8 = 0xFF;

/// Lightest of the four luminance levels; used when blanking the screen.
const SHADE_LIGHTEST: u8 = 0;

bitflags! {
    /// Display control register (LCDC, 0xFF40).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Control: u8 {
        const DISPLAY_ENABLE = 0x80;
        /// Window tile map select: 0x9800 (clear) or 0x9C00 (set).
        const WINDOW_MAP = 0x40;
        const WINDOW_ENABLE = 0x20;
        /// Tile data bank select: signed 0x8800-based (clear) or unsigned
        /// 0x8000-based (set).
        const TILE_DATA = 0x10;
        /// Background tile map select: 0x9800 (clear) or 0x9C00 (set).
        const BG_MAP = 0x08;
        /// Sprite height: 8x8 (clear) or 8x16 (set).
        const SPRITE_SIZE = 0x04;
        const SPRITE_ENABLE = 0x02;
        const BG_ENABLE = 0x01;
    }
}

/// Scanline mode. The numeric values are the STAT register's mode bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

impl Mode {
    #[inline]
    fn bits(self) -> u8 {
        self as u8
    }

    fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamSearch,
            _ => Mode::PixelTransfer,
        }
    }
}

pub struct Ppu {
    pub(crate) vram: [u8; VRAM_SIZE],
    pub(crate) oam: [u8; OAM_SIZE],
    pub(crate) control: Control,
    pub(crate) mode: Mode,
    /// Remaining ticks in the current mode.
    pub(crate) mode_ticks_left: u32,
    pub(crate) line: u8,
    pub(crate) line_compare: u8,
    pub(crate) coincidence: bool,
    /// STAT bits 3-6 as written by software.
    pub(crate) stat_enables: u8,
    pub(crate) scroll_y: u8,
    pub(crate) scroll_x: u8,
    pub(crate) window_y: u8,
    pub(crate) window_x: u8,
    pub(crate) bg_palette: u8,
    pub(crate) sprite_palette: [u8; 2],
    /// OAM indices of the up-to-10 sprites selected for the current line,
    /// in table order.
    pub(crate) line_sprites: [u8; MAX_LINE_SPRITES],
    pub(crate) line_sprite_count: u8,
    /// Double-buffered framebuffer, one resolved 4-level shade per pixel.
    /// `front` indexes the completed frame; rendering targets the other.
    frames: [Vec<u8>; 2],
    front: usize,
    frames_presented: u64,
    on_frame: Option<Box<dyn FnMut(&[u8])>>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Create a PPU in the post-boot state: display on, background
    /// enabled, unsigned tile data, line 0 at the start of OAM search.
    pub fn new() -> Self {
        let mut ppu = Self {
            vram: [0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
            control: Control::from_bits_retain(0x91),
            mode: Mode::OamSearch,
            mode_ticks_left: OAM_SEARCH_TICKS,
            line: 0,
            line_compare: 0,
            coincidence: true,
            stat_enables: 0,
            scroll_y: 0,
            scroll_x: 0,
            window_y: 0,
            window_x: 0,
            bg_palette: 0xFC,
            sprite_palette: [0xFF, 0xFF],
            line_sprites: [0; MAX_LINE_SPRITES],
            line_sprite_count: 0,
            frames: [
                vec![SHADE_LIGHTEST; SCREEN_WIDTH * SCREEN_HEIGHT],
                vec![SHADE_LIGHTEST; SCREEN_WIDTH * SCREEN_HEIGHT],
            ],
            front: 0,
            frames_presented: 0,
            on_frame: None,
        };
        ppu.select_line_sprites();
        ppu
    }

    /// Advance the PPU by one machine quantum (4 elementary ticks).
    ///
    /// While the display is off the PPU is frozen and consumes nothing.
    pub fn step(&mut self, irq: &mut InterruptController) {
        if !self.control.contains(Control::DISPLAY_ENABLE) {
            return;
        }

        debug_assert!(
            self.mode_ticks_left >= TICKS_PER_STEP
                && self.mode_ticks_left % TICKS_PER_STEP == 0,
            "mode counter out of phase: {} ticks left in {:?}",
            self.mode_ticks_left,
            self.mode,
        );

        self.mode_ticks_left -= TICKS_PER_STEP;
        if self.mode_ticks_left == 0 {
            self.advance_mode(irq);
        }
    }

    /// Transition to the next mode in the fixed sequence
    /// OAMSearch(80) -> PixelTransfer(172) -> HBlank(204) -> next line,
    /// with lines 144..153 spent in VBlank (456 ticks each, no rendering).
    fn advance_mode(&mut self, irq: &mut InterruptController) {
        match self.mode {
            Mode::OamSearch => {
                self.mode = Mode::PixelTransfer;
                self.mode_ticks_left = PIXEL_TRANSFER_TICKS;
                self.render_scanline();
            }
            Mode::PixelTransfer => {
                self.mode = Mode::HBlank;
                self.mode_ticks_left = HBLANK_TICKS;
                if self.stat_enables & STAT_HBLANK_IRQ != 0 {
                    irq.request(Interrupt::LcdStat);
                }
            }
            Mode::HBlank => {
                self.set_line(self.line + 1, irq);
                if self.line == VISIBLE_LINES {
                    self.mode = Mode::VBlank;
                    self.mode_ticks_left = LINE_TICKS;
                    irq.request(Interrupt::VBlank);
                    if self.stat_enables & STAT_VBLANK_IRQ != 0 {
                        irq.request(Interrupt::LcdStat);
                    }
                    log::debug!("vblank start (frame {})", self.frames_presented);
                } else {
                    self.enter_oam_search(irq);
                }
            }
            Mode::VBlank => {
                if self.line == LAST_LINE {
                    self.present_frame();
                    self.set_line(0, irq);
                    self.enter_oam_search(irq);
                } else {
                    self.set_line(self.line + 1, irq);
                    self.mode_ticks_left = LINE_TICKS;
                }
            }
        }
    }

    fn enter_oam_search(&mut self, irq: &mut InterruptController) {
        self.mode = Mode::OamSearch;
        self.mode_ticks_left = OAM_SEARCH_TICKS;
        self.select_line_sprites();
        if self.stat_enables & STAT_OAM_IRQ != 0 {
            irq.request(Interrupt::LcdStat);
        }
    }

    /// Move to `line` and perform the once-per-line coincidence check.
    ///
    /// The LCD-status request is raised only here, at the line boundary,
    /// never continuously while LY == LYC holds.
    fn set_line(&mut self, line: u8, irq: &mut InterruptController) {
        self.line = line;
        self.coincidence = self.line == self.line_compare;
        if self.coincidence && self.stat_enables & STAT_LYC_IRQ != 0 {
            irq.request(Interrupt::LcdStat);
        }
    }

    /// Flip the double buffer at the VBlank -> OAMSearch wrap and hand the
    /// completed frame to the host.
    fn present_frame(&mut self) {
        self.front ^= 1;
        self.frames_presented += 1;
        if let Some(callback) = self.on_frame.as_mut() {
            callback(&self.frames[self.front]);
        }
    }

    /// Scan all 40 OAM entries in table order and keep the first 10 whose
    /// Y-range covers the current line at the current sprite height.
    ///
    /// Table order is also the tie-break when more than 10 qualify; the
    /// real display chip breaks ties by X coordinate, and this deviation is
    /// a known, intentional simplification.
    fn select_line_sprites(&mut self) {
        self.line_sprite_count = 0;
        let height: i16 = if self.control.contains(Control::SPRITE_SIZE) {
            16
        } else {
            8
        };
        let line = self.line as i16;

        for index in 0..OAM_ENTRIES {
            let top = self.oam[index * 4] as i16 - 16;
            if line >= top && line < top + height {
                self.line_sprites[self.line_sprite_count as usize] = index as u8;
                self.line_sprite_count += 1;
                if self.line_sprite_count as usize == MAX_LINE_SPRITES {
                    break;
                }
            }
        }
    }

    // --- Display enable -------------------------------------------------

    /// Named transition for the display-enable bit.
    ///
    /// Turning the display off blanks the visible buffer to the lightest
    /// shade and freezes the state machine at HBlank, line 0 (the power-on
    /// baseline). Turning it back on resumes at OAM search on line 0.
    pub fn set_display_enabled(&mut self, enabled: bool) {
        if self.control.contains(Control::DISPLAY_ENABLE) == enabled {
            return;
        }
        self.control.set(Control::DISPLAY_ENABLE, enabled);

        if enabled {
            log::debug!("display enabled; resuming at OAM search, line 0");
            self.line = 0;
            self.coincidence = self.line == self.line_compare;
            self.mode = Mode::OamSearch;
            self.mode_ticks_left = OAM_SEARCH_TICKS;
            self.select_line_sprites();
        } else {
            log::debug!("display disabled; blanking and freezing at HBlank, line 0");
            self.frames[self.front].fill(SHADE_LIGHTEST);
            self.line = 0;
            self.coincidence = self.line == self.line_compare;
            self.mode = Mode::HBlank;
            self.mode_ticks_left = HBLANK_TICKS;
        }
    }

    // --- Framebuffer handoff --------------------------------------------

    /// The most recently completed frame, one 4-level shade per pixel
    /// (0 = lightest), row-major 160x144. Read-only; the PPU never renders
    /// into the buffer this returns.
    pub fn frame(&self) -> &[u8] {
        &self.frames[self.front]
    }

    /// Index of the buffer currently being rendered into.
    #[inline]
    pub(crate) fn back_index(&self) -> usize {
        self.front ^ 1
    }

    #[inline]
    pub(crate) fn back_frame(&mut self) -> &mut [u8] {
        let back = self.back_index();
        &mut self.frames[back]
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Install a callback fired once per full frame, at the VBlank ->
    /// OAMSearch wrap, with the completed front buffer.
    pub fn set_frame_callback(&mut self, callback: impl FnMut(&[u8]) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    // --- Memory gating --------------------------------------------------

    /// Tile/map memory is accessible except during pixel transfer (always
    /// accessible while the display is off).
    fn vram_accessible(&self) -> bool {
        !self.control.contains(Control::DISPLAY_ENABLE) || self.mode != Mode::PixelTransfer
    }

    /// Sprite memory is accessible only during HBlank/VBlank (always
    /// accessible while the display is off).
    fn oam_accessible(&self) -> bool {
        !self.control.contains(Control::DISPLAY_ENABLE)
            || matches!(self.mode, Mode::HBlank | Mode::VBlank)
    }

    /// Gated VRAM read; `addr` is the absolute bus address (0x8000-0x9FFF).
    pub fn vram_read(&self, addr: u16) -> u8 {
        if !self.vram_accessible() {
            log::warn!("VRAM read blocked in {:?} (addr=0x{addr:04X})", self.mode);
            return BLOCKED_READ;
        }
        self.vram[(addr as usize) & (VRAM_SIZE - 1)]
    }

    /// Gated VRAM write; blocked writes are silently dropped.
    pub fn vram_write(&mut self, addr: u16, value: u8) {
        if !self.vram_accessible() {
            log::warn!("VRAM write blocked in {:?} (addr=0x{addr:04X})", self.mode);
            return;
        }
        self.vram[(addr as usize) & (VRAM_SIZE - 1)] = value;
    }

    /// Gated OAM read; `addr` is the absolute bus address (0xFE00-0xFE9F).
    pub fn oam_read(&self, addr: u16) -> u8 {
        if !self.oam_accessible() {
            log::warn!("OAM read blocked in {:?} (addr=0x{addr:04X})", self.mode);
            return BLOCKED_READ;
        }
        self.oam[(addr as usize - 0xFE00) % OAM_SIZE]
    }

    /// Gated OAM write; blocked writes are silently dropped.
    pub fn oam_write(&mut self, addr: u16, value: u8) {
        if !self.oam_accessible() {
            log::warn!("OAM write blocked in {:?} (addr=0x{addr:04X})", self.mode);
            return;
        }
        self.oam[(addr as usize - 0xFE00) % OAM_SIZE] = value;
    }

    // --- Register pass-through ------------------------------------------

    pub fn read_register(&self, addr: u16) -> u8 {
        match addr {
            IO_LCDC => self.control.bits(),
            IO_STAT => {
                // Bit 7 is unimplemented and reads as 1.
                0x80 | self.stat_enables
                    | if self.coincidence { 0x04 } else { 0 }
                    | self.mode.bits()
            }
            IO_SCY => self.scroll_y,
            IO_SCX => self.scroll_x,
            IO_LY => self.line,
            IO_LYC => self.line_compare,
            IO_BGP => self.bg_palette,
            IO_OBP0 => self.sprite_palette[0],
            IO_OBP1 => self.sprite_palette[1],
            IO_WY => self.window_y,
            IO_WX => self.window_x,
            _ => 0xFF,
        }
    }

    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            IO_LCDC => {
                // Update the plain control bits first, then route bit 7
                // through the named transition so its side effects stay an
                // explicit, testable step.
                let enable = value & 0x80 != 0;
                let keep_enable = self.control & Control::DISPLAY_ENABLE;
                self.control = Control::from_bits_retain(value & 0x7F) | keep_enable;
                self.set_display_enabled(enable);
            }
            IO_STAT => self.stat_enables = value & STAT_ENABLE_MASK,
            IO_SCY => self.scroll_y = value,
            IO_SCX => self.scroll_x = value,
            // LY is read-only.
            IO_LY => {}
            IO_LYC => {
                self.line_compare = value;
                // The flag tracks the new compare value immediately; the
                // interrupt waits for the next line boundary.
                self.coincidence = self.line == self.line_compare;
            }
            IO_BGP => self.bg_palette = value,
            IO_OBP0 => self.sprite_palette[0] = value,
            IO_OBP1 => self.sprite_palette[1] = value,
            IO_WY => self.window_y = value,
            IO_WX => self.window_x = value,
            _ => {}
        }
    }

    // --- Accessors used by hosts and tests ------------------------------

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn line(&self) -> u8 {
        self.line
    }
}

/// VRAM + OAM + registers + state-machine fields. The framebuffers are
/// derived output and are not part of the mutable state contract.
const PPU_STATE_LEN: usize = VRAM_SIZE + OAM_SIZE + 28;

impl SaveState for Ppu {
    fn state_len(&self) -> usize {
        PPU_STATE_LEN
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.vram);
        out.extend_from_slice(&self.oam);
        out.push(self.control.bits());
        out.push(self.mode.bits());
        out.extend_from_slice(&self.mode_ticks_left.to_le_bytes());
        out.push(self.line);
        out.push(self.line_compare);
        out.push(self.coincidence as u8);
        out.push(self.stat_enables);
        out.push(self.scroll_y);
        out.push(self.scroll_x);
        out.push(self.window_y);
        out.push(self.window_x);
        out.push(self.bg_palette);
        out.extend_from_slice(&self.sprite_palette);
        out.extend_from_slice(&self.line_sprites);
        out.push(self.line_sprite_count);
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError> {
        check_len(PPU_STATE_LEN, data)?;

        let mut reader = FieldReader::new(data);
        self.vram.copy_from_slice(reader.bytes(VRAM_SIZE));
        self.oam.copy_from_slice(reader.bytes(OAM_SIZE));
        self.control = Control::from_bits_retain(reader.u8());
        self.mode = Mode::from_bits(reader.u8());
        self.mode_ticks_left = reader.u32();
        self.line = reader.u8();
        self.line_compare = reader.u8();
        self.coincidence = reader.u8() != 0;
        self.stat_enables = reader.u8() & STAT_ENABLE_MASK;
        self.scroll_y = reader.u8();
        self.scroll_x = reader.u8();
        self.window_y = reader.u8();
        self.window_x = reader.u8();
        self.bg_palette = reader.u8();
        let palettes = reader.bytes(2);
        self.sprite_palette.copy_from_slice(palettes);
        let sprites = reader.bytes(MAX_LINE_SPRITES);
        self.line_sprites.copy_from_slice(sprites);
        self.line_sprite_count = reader.u8().min(MAX_LINE_SPRITES as u8);
        Ok(())
    }
}
