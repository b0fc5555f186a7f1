// Sprite evaluation, fetch and per-pixel lookup
//
// A scanline prepares the sprites of the *next* line: dots 1-64 clear
// secondary OAM, dots 65-256 scan primary OAM for sprites in range, and
// dots 257-320 fetch pattern data for up to eight of them into the output
// units. The output units are what the next line draws from.

use super::constants::*;
use super::Ppu;
use crate::config::SpriteOverflow;

/// Sprite pixel found at a picture column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SpritePixel {
    /// 2-bit pixel value, never 0
    pub(super) pixel: u8,
    /// Sprite palette (0-3, for palettes 4-7)
    pub(super) palette: u8,
    pub(super) behind_background: bool,
    /// Pixel comes from OAM entry 0
    pub(super) sprite_zero: bool,
}

/// Attribute byte bits
const ATTR_PALETTE: u8 = 0x03;
const ATTR_BEHIND_BACKGROUND: u8 = 0x20;
const ATTR_FLIP_HORIZONTAL: u8 = 0x40;
const ATTR_FLIP_VERTICAL: u8 = 0x80;

impl Ppu {
    /// Sprite height in pixels (8 for 8x8 mode, 16 for 8x16 mode)
    pub(super) fn sprite_height(&self) -> u16 {
        if self.ppuctrl & CTRL_SPRITE_SIZE_16 != 0 {
            16
        } else {
            8
        }
    }

    /// Row of a sprite with top coordinate `y` on the current scanline, if in range
    fn sprite_row(&self, y: u8) -> Option<u16> {
        let row = self.scanline.checked_sub(y as u16)?;
        (row < self.sprite_height()).then_some(row)
    }

    /// Empty the output units; the next line draws no sprites
    pub(super) fn clear_sprite_units(&mut self) {
        self.sprite_count = 0;
        self.sprite_zero_current = false;
        self.sprite_patterns = [[0; 2]; MAX_SPRITES_PER_LINE];
        self.sprite_attributes = [0; MAX_SPRITES_PER_LINE];
        self.sprite_x = [0xFF; MAX_SPRITES_PER_LINE];
    }

    // ========================================
    // Evaluation
    // ========================================

    /// Dot 0 of a visible line, rendering or not
    ///
    /// Evaluation always starts from an empty secondary OAM. With rendering
    /// off nothing is fetched for this line, so the output units are emptied
    /// as well and a mid-line enable cannot draw sprites from an older line.
    pub(super) fn begin_sprite_line(&mut self) {
        self.sprite_eval_count = 0;
        self.sprite_zero_next = false;
        self.overflow_offset = 0;
        self.overflow_found = false;

        if !self.rendering_enabled() {
            self.clear_sprite_units();
        }
    }

    /// Dots 2-64 (even): fill one secondary OAM byte with $FF
    pub(super) fn clear_secondary_oam(&mut self) {
        let index = (self.dot / 2 - 1) as usize;
        self.secondary_oam[index] = 0xFF;
    }

    /// Dots 65-191 (odd): examine primary OAM entry n = (dot - 65) / 2
    pub(super) fn evaluate_sprite(&mut self) {
        let n = ((self.dot - 65) / 2) as usize;

        if self.sprite_eval_count < MAX_SPRITES_PER_LINE {
            let entry = &self.oam[n * 4..n * 4 + 4];
            if self.sprite_row(entry[0]).is_some() {
                let slot = self.sprite_eval_count * 4;
                self.secondary_oam[slot..slot + 4].copy_from_slice(entry);
                if n == 0 {
                    self.sprite_zero_next = true;
                }
                self.sprite_eval_count += 1;
            }
            return;
        }

        if self.overflow_found {
            return;
        }

        match self.overflow_mode {
            SpriteOverflow::Exact => {
                if self.sprite_row(self.oam[n * 4]).is_some() {
                    self.set_sprite_overflow(n);
                }
            }
            SpriteOverflow::Hardware => {
                // The scan reads byte m of entry n as a Y coordinate and, on
                // a miss, advances both n and m
                let byte = self.oam[n * 4 + self.overflow_offset];
                if self.sprite_row(byte).is_some() {
                    self.set_sprite_overflow(n);
                } else {
                    self.overflow_offset = (self.overflow_offset + 1) & 0x03;
                }
            }
        }
    }

    fn set_sprite_overflow(&mut self, n: usize) {
        log::trace!(
            "Sprite overflow on scanline {} at OAM entry {}",
            self.scanline,
            n
        );
        self.overflow_found = true;
        self.ppustatus |= STATUS_SPRITE_OVERFLOW;
    }

    // ========================================
    // Fetch
    // ========================================

    /// Dots 264, 272, ..., 320: load one output unit from secondary OAM
    pub(super) fn fetch_sprite(&mut self) {
        let slot = ((self.dot - 257) / 8) as usize;

        if slot == 0 {
            self.sprite_count = self.sprite_eval_count;
            self.sprite_zero_current = self.sprite_zero_next;
        }

        if slot >= self.sprite_eval_count {
            self.load_transparent_unit(slot);
            return;
        }

        let entry = &self.secondary_oam[slot * 4..slot * 4 + 4];
        let (y, tile, attributes, x) = (entry[0], entry[1], entry[2], entry[3]);

        // Out of range when the sprite size changed after evaluation
        let Some(mut row) = self.sprite_row(y) else {
            self.load_transparent_unit(slot);
            return;
        };

        let height = self.sprite_height();
        if attributes & ATTR_FLIP_VERTICAL != 0 {
            row = height - 1 - row;
        }

        let address = if height == 8 {
            let table = if self.ppuctrl & CTRL_SPRITE_TABLE != 0 {
                0x1000
            } else {
                0x0000
            };
            table + tile as u16 * 16 + row
        } else {
            // 8x16: bit 0 selects the pattern table, bits 1-7 the tile pair
            let table = (tile as u16 & 0x01) * 0x1000;
            let tile = (tile & 0xFE) as u16 + row / 8;
            table + tile * 16 + row % 8
        };

        let mut planes = [self.bus.read(address), self.bus.read(address + 8)];
        if attributes & ATTR_FLIP_HORIZONTAL != 0 {
            planes = planes.map(u8::reverse_bits);
        }

        self.sprite_patterns[slot] = planes;
        self.sprite_attributes[slot] = attributes;
        self.sprite_x[slot] = x;
    }

    fn load_transparent_unit(&mut self, slot: usize) {
        self.sprite_patterns[slot] = [0; 2];
        self.sprite_attributes[slot] = 0;
        self.sprite_x[slot] = 0xFF;
    }

    // ========================================
    // Pixel lookup
    // ========================================

    /// First opaque sprite pixel at picture column `x`, in OAM order
    pub(super) fn sprite_pixel(&self, x: usize) -> Option<SpritePixel> {
        if self.ppumask & MASK_SHOW_SPRITES == 0
            || (x < 8 && self.ppumask & MASK_SHOW_SPRITES_LEFT == 0)
        {
            return None;
        }

        (0..self.sprite_count).find_map(|slot| {
            let column = x.checked_sub(self.sprite_x[slot] as usize)?;
            if column >= 8 {
                return None;
            }

            let bit = 7 - column;
            let [lo, hi] = self.sprite_patterns[slot];
            let pixel = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
            if pixel == 0 {
                return None;
            }

            let attributes = self.sprite_attributes[slot];
            Some(SpritePixel {
                pixel,
                palette: attributes & ATTR_PALETTE,
                behind_background: attributes & ATTR_BEHIND_BACKGROUND != 0,
                sprite_zero: slot == 0 && self.sprite_zero_current,
            })
        })
    }
}
