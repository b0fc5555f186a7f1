// PPU rendering logic - background pipeline and pixel output
//
// Each 8-dot fetch window reads four bytes for one tile (name, attribute,
// pattern low, pattern high) into latches. Every eighth dot the latches are
// loaded into the low byte of the shift registers, and the pixel drawn on a
// dot is taken from bit (15 - fine X) of the shifters.

use super::constants::*;
use super::events::ScanlineKind;
use super::palette::palette_to_rgb;
use super::Ppu;

impl Ppu {
    // ========================================
    // Fetches
    // ========================================

    pub(super) fn fetch_name(&mut self) {
        self.nametable_latch = self.bus.read(self.v.tile_address());
    }

    /// Fetch the attribute byte and keep only this tile's 2-bit palette
    pub(super) fn fetch_attribute(&mut self) {
        let attribute = self.bus.read(self.v.attribute_address());
        self.attribute_latch = (attribute >> self.v.attribute_shift()) & 0x03;
    }

    /// Fetch one pattern plane (0 = low, 1 = high) of the latched tile
    pub(super) fn fetch_pattern(&mut self, plane: usize) {
        let table = if self.ppuctrl & CTRL_BG_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let address =
            table + self.nametable_latch as u16 * 16 + self.v.fine_y() + plane as u16 * 8;
        self.pattern_latches[plane] = self.bus.read(address);
    }

    // ========================================
    // Shift registers
    // ========================================

    pub(super) fn shift_registers(&mut self) {
        for plane in 0..2 {
            self.pattern_shift[plane] <<= 1;
            self.attribute_shift[plane] <<= 1;
        }
    }

    /// Load the latched tile into the low byte of the shifters
    pub(super) fn reload_shifters(&mut self) {
        for plane in 0..2 {
            self.pattern_shift[plane] =
                (self.pattern_shift[plane] & 0xFF00) | self.pattern_latches[plane] as u16;

            // Attribute bits are constant across a tile: expand to 8 pixels
            let fill = if self.attribute_latch & (1 << plane) != 0 {
                0x00FF
            } else {
                0x0000
            };
            self.attribute_shift[plane] = (self.attribute_shift[plane] & 0xFF00) | fill;
        }
    }

    /// Background pixel at picture column `x`
    ///
    /// # Returns
    ///
    /// (2-bit pixel, 2-bit palette); pixel 0 is transparent
    pub(super) fn background_pixel(&self, x: usize) -> (u8, u8) {
        if self.ppumask & MASK_SHOW_BG == 0 || (x < 8 && self.ppumask & MASK_SHOW_BG_LEFT == 0) {
            return (0, 0);
        }

        let bit = 15 - self.fine_x as u16;
        let select = |shifter: u16| ((shifter >> bit) & 1) as u8;

        let pixel = (select(self.pattern_shift[1]) << 1) | select(self.pattern_shift[0]);
        let palette = (select(self.attribute_shift[1]) << 1) | select(self.attribute_shift[0]);
        (pixel, palette)
    }

    // ========================================
    // Pixel output
    // ========================================

    /// Write the color for the current (scanline, dot) into the color buffer
    pub(super) fn output_dot(&mut self, kind: ScanlineKind) {
        let picture_dot = (1..=SCREEN_WIDTH as u16).contains(&self.dot);

        let palette_address = if kind == ScanlineKind::Visible && picture_dot {
            self.compose_pixel((self.dot - 1) as usize)
        } else {
            self.backdrop()
        };

        let mut color = self.bus.read(palette_address) & 0x3F;
        if self.ppumask & MASK_GREYSCALE != 0 {
            color &= 0x30;
        }

        let cell = self.scanline as usize * DOTS_PER_SCANLINE as usize + self.dot as usize;
        self.color_buffer[cell] = palette_to_rgb(color);
    }

    /// Palette address of the backdrop color
    ///
    /// With rendering off and `v` pointing into palette RAM, the PPU outputs
    /// the entry `v` points at instead of entry 0.
    fn backdrop(&self) -> u16 {
        let address = self.v.get() & 0x3FFF;
        if !self.rendering_enabled() && address >= PALETTE_BASE {
            address
        } else {
            PALETTE_BASE
        }
    }

    /// Mix background and sprite pixels at picture column `x` into a palette address
    fn compose_pixel(&mut self, x: usize) -> u16 {
        if !self.rendering_enabled() {
            return self.backdrop();
        }

        let (bg_pixel, bg_palette) = self.background_pixel(x);
        let sprite = self.sprite_pixel(x);

        let background = PALETTE_BASE | ((bg_palette as u16) << 2) | bg_pixel as u16;

        match sprite {
            None if bg_pixel == 0 => self.backdrop(),
            None => background,
            Some(sprite) => {
                let foreground =
                    PALETTE_BASE | 0x10 | ((sprite.palette as u16) << 2) | sprite.pixel as u16;

                if bg_pixel == 0 {
                    return foreground;
                }

                if sprite.sprite_zero && x != SCREEN_WIDTH - 1 {
                    self.sprite_zero_hit(x);
                }

                if sprite.behind_background {
                    background
                } else {
                    foreground
                }
            }
        }
    }

    fn sprite_zero_hit(&mut self, x: usize) {
        if self.ppustatus & STATUS_SPRITE_ZERO_HIT == 0 {
            log::trace!(
                "Sprite 0 hit at ({}, {}) in frame {}",
                x,
                self.scanline,
                self.frame_count
            );
            self.ppustatus |= STATUS_SPRITE_ZERO_HIT;
        }
    }
}
