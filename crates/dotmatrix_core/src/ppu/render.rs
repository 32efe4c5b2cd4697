//! Scanline composition: background, window overlay, then sprites.
//!
//! Pixels are composed in a scratch row and copied into the back buffer in
//! one shot at the end. A parallel row of raw (pre-palette) background
//! colour indices drives the sprite behind-background priority rule.

use crate::ppu::{Control, Ppu};
use crate::SCREEN_WIDTH;

/// Map a 2-bit colour index through an 8-bit palette register to a final
/// shade (0 = lightest, 3 = darkest).
#[inline]
fn shade(palette: u8, color: u8) -> u8 {
    (palette >> (color * 2)) & 0x03
}

impl Ppu {
    /// Render the current line into the back buffer. Called exactly once
    /// per line, on the OAMSearch -> PixelTransfer transition.
    pub(super) fn render_scanline(&mut self) {
        let line = self.line as usize;
        debug_assert!(line < crate::SCREEN_HEIGHT);

        // Raw background colour indices (0-3 before palette mapping);
        // sprites with the behind-background attribute hide under any
        // non-zero entry.
        let mut raw = [0u8; SCREEN_WIDTH];
        let mut shades = [shade(self.bg_palette, 0); SCREEN_WIDTH];

        if self.control.contains(Control::BG_ENABLE) {
            self.render_background(&mut raw, &mut shades);
            if self.control.contains(Control::WINDOW_ENABLE) {
                self.render_window(&mut raw, &mut shades);
            }
        }
        if self.control.contains(Control::SPRITE_ENABLE) {
            self.render_sprites(&raw, &mut shades);
        }

        let offset = line * SCREEN_WIDTH;
        self.back_frame()[offset..offset + SCREEN_WIDTH].copy_from_slice(&shades);
    }

    fn render_background(&self, raw: &mut [u8; SCREEN_WIDTH], shades: &mut [u8; SCREEN_WIDTH]) {
        let map_base = self.map_base(Control::BG_MAP);
        let y = self.line.wrapping_add(self.scroll_y);

        for x in 0..SCREEN_WIDTH {
            let map_x = (x as u8).wrapping_add(self.scroll_x);
            let color = self.tile_pixel(map_base, map_x, y);
            raw[x] = color;
            shades[x] = shade(self.bg_palette, color);
        }
    }

    /// Overlay the window: an unscrolled second background plane covering
    /// the rectangle from (WX-7, WY) to the bottom-right screen corner.
    fn render_window(&self, raw: &mut [u8; SCREEN_WIDTH], shades: &mut [u8; SCREEN_WIDTH]) {
        if self.line < self.window_y || self.window_x > 166 {
            return;
        }
        let map_base = self.map_base(Control::WINDOW_MAP);
        let window_line = self.line - self.window_y;
        let origin = self.window_x.saturating_sub(7) as usize;

        for x in origin..SCREEN_WIDTH {
            let window_x = (x + 7 - self.window_x as usize) as u8;
            let color = self.tile_pixel(map_base, window_x, window_line);
            raw[x] = color;
            shades[x] = shade(self.bg_palette, color);
        }
    }

    /// Composite the line's selected sprites back to front, so that on
    /// overlap the earliest OAM entry wins.
    fn render_sprites(&self, raw: &[u8; SCREEN_WIDTH], shades: &mut [u8; SCREEN_WIDTH]) {
        let height: i16 = if self.control.contains(Control::SPRITE_SIZE) {
            16
        } else {
            8
        };
        let line = self.line as i16;
        let selected = &self.line_sprites[..self.line_sprite_count as usize];

        for &index in selected.iter().rev() {
            let entry = &self.oam[index as usize * 4..index as usize * 4 + 4];
            let top = entry[0] as i16 - 16;
            let left = entry[1] as i16 - 8;
            let mut tile = entry[2];
            let attrs = entry[3];

            let behind_bg = attrs & 0x80 != 0;
            let flip_y = attrs & 0x40 != 0;
            let flip_x = attrs & 0x20 != 0;
            let palette = self.sprite_palette[usize::from(attrs & 0x10 != 0)];

            // In 8x16 mode the hardware ignores the tile index's low bit;
            // row 8 onward falls through into the odd tile of the pair.
            if height == 16 {
                tile &= 0xFE;
            }
            let mut row = (line - top) as u16;
            debug_assert!(row < height as u16, "sprite {index} not on line {line}");
            if flip_y {
                row = height as u16 - 1 - row;
            }

            let row_addr = (tile as u16 * 16 + row * 2) as usize;
            let low = self.vram[row_addr];
            let high = self.vram[row_addr + 1];

            for col in 0..8i16 {
                let x = left + col;
                if !(0..SCREEN_WIDTH as i16).contains(&x) {
                    continue;
                }
                let bit = if flip_x { col } else { 7 - col } as u8;
                let color = ((high >> bit) & 1) << 1 | ((low >> bit) & 1);
                // Colour 0 is transparent for sprites.
                if color == 0 {
                    continue;
                }
                if behind_bg && raw[x as usize] != 0 {
                    continue;
                }
                shades[x as usize] = shade(palette, color);
            }
        }
    }

    /// VRAM-relative base of a 32x32 tile map.
    #[inline]
    fn map_base(&self, select: Control) -> usize {
        if self.control.contains(select) {
            0x1C00
        } else {
            0x1800
        }
    }

    /// Decode one background/window pixel: map lookup, tile-data
    /// addressing, then 2bpp planar row extraction.
    fn tile_pixel(&self, map_base: usize, x: u8, y: u8) -> u8 {
        let map_index = map_base + (y as usize / 8) * 32 + x as usize / 8;
        let tile = self.vram[map_index];

        // Bank select: unsigned indices from 0x8000 or signed from 0x9000.
        let tile_addr = if self.control.contains(Control::TILE_DATA) {
            tile as usize * 16
        } else {
            (0x1000i32 + tile as i8 as i32 * 16) as usize
        };

        let row = (y & 7) as usize;
        let low = self.vram[tile_addr + row * 2];
        let high = self.vram[tile_addr + row * 2 + 1];
        let bit = 7 - (x & 7);
        ((high >> bit) & 1) << 1 | ((low >> bit) & 1)
    }
}
