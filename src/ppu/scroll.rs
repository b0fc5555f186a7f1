// VRAM address register layout (the internal `v` and `t` registers)
//
//   yyy NN YYYYY XXXXX
//   ||| || ||||| +++++-- coarse X scroll
//   ||| || +++++-------- coarse Y scroll
//   ||| ++-------------- nametable select
//   +++----------------- fine Y scroll

const COARSE_X: u16 = 0x001F;
const COARSE_Y: u16 = 0x03E0;
const NAMETABLE_X: u16 = 0x0400;
const NAMETABLE_Y: u16 = 0x0800;
const NAMETABLE: u16 = NAMETABLE_X | NAMETABLE_Y;
const FINE_Y: u16 = 0x7000;

/// Bits copied from `t` into `v` at the end of each scanline
const HORIZONTAL_BITS: u16 = COARSE_X | NAMETABLE_X;

/// Bits copied from `t` into `v` during the pre-render scanline
const VERTICAL_BITS: u16 = FINE_Y | NAMETABLE_Y | COARSE_Y;

/// 15-bit VRAM address with scroll fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VramAddress(u16);

impl VramAddress {
    /// Wrap a raw value, dropping bit 15
    pub fn new(raw: u16) -> Self {
        VramAddress(raw & 0x7FFF)
    }

    /// Raw 15-bit value
    pub fn get(self) -> u16 {
        self.0
    }

    /// Replace the raw value
    pub fn set(&mut self, raw: u16) {
        self.0 = raw & 0x7FFF;
    }

    pub fn coarse_x(self) -> u16 {
        self.0 & COARSE_X
    }

    pub fn coarse_y(self) -> u16 {
        (self.0 & COARSE_Y) >> 5
    }

    pub fn nametable(self) -> u16 {
        (self.0 & NAMETABLE) >> 10
    }

    pub fn fine_y(self) -> u16 {
        (self.0 & FINE_Y) >> 12
    }

    /// Set the nametable select bits (as written through PPUCTRL)
    pub fn set_nametable(&mut self, nametable: u8) {
        self.0 = (self.0 & !NAMETABLE) | (((nametable as u16) & 0x03) << 10);
    }

    pub fn set_coarse_x(&mut self, coarse_x: u8) {
        self.0 = (self.0 & !COARSE_X) | ((coarse_x as u16) & 0x1F);
    }

    pub fn set_coarse_y(&mut self, coarse_y: u8) {
        self.0 = (self.0 & !COARSE_Y) | (((coarse_y as u16) & 0x1F) << 5);
    }

    pub fn set_fine_y(&mut self, fine_y: u8) {
        self.0 = (self.0 & !FINE_Y) | (((fine_y as u16) & 0x07) << 12);
    }

    /// Address of the tile byte for the current position
    pub fn tile_address(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Address of the attribute byte covering the current tile
    pub fn attribute_address(self) -> u16 {
        0x23C0 | (self.0 & NAMETABLE) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Shift that selects this tile's 2-bit palette out of an attribute byte
    pub fn attribute_shift(self) -> u8 {
        (((self.0 >> 4) & 0x04) | (self.0 & 0x02)) as u8
    }

    /// Advance to the next tile column
    ///
    /// Coarse X wraps 31 -> 0 and switches the horizontal nametable.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !COARSE_X;
            self.0 ^= NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    /// Advance to the next pixel row
    ///
    /// Fine Y carries into coarse Y. Coarse Y wraps 29 -> 0 and switches the
    /// vertical nametable; rows 30 and 31 are attribute space, reachable only
    /// by writing them directly, and wrap 31 -> 0 without the switch.
    pub fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.0 += 0x1000;
            return;
        }

        self.0 &= !FINE_Y;
        let coarse_y = match self.coarse_y() {
            29 => {
                self.0 ^= NAMETABLE_Y;
                0
            }
            31 => 0,
            y => y + 1,
        };
        self.0 = (self.0 & !COARSE_Y) | (coarse_y << 5);
    }

    /// Copy the horizontal scroll fields from `t`
    pub fn copy_x(&mut self, from: VramAddress) {
        self.0 = (self.0 & !HORIZONTAL_BITS) | (from.0 & HORIZONTAL_BITS);
    }

    /// Copy the vertical scroll fields from `t`
    pub fn copy_y(&mut self, from: VramAddress) {
        self.0 = (self.0 & !VERTICAL_BITS) | (from.0 & VERTICAL_BITS);
    }
}
