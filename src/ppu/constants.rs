// PPU constants

/// PPU register address mask for mirroring
///
/// PPU registers are 8 bytes ($2000-$2007) but mirrored throughout $2000-$3FFF.
pub(super) const PPU_REGISTER_MASK: u16 = 0x0007;

/// Size of the internal nametable RAM (two 1KB tables)
pub(super) const NAMETABLE_RAM_SIZE: usize = 0x800;

/// Size of one nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: u16 = 0x400;

/// Size of palette RAM in bytes
pub(super) const PALETTE_SIZE: usize = 32;

/// Size of primary OAM (64 sprites × 4 bytes)
pub(super) const OAM_SIZE: usize = 256;

/// Size of secondary OAM (8 sprites × 4 bytes)
pub(super) const SECONDARY_OAM_SIZE: usize = 32;

/// Sprites drawn per scanline
pub(super) const MAX_SPRITES_PER_LINE: usize = 8;

// ========================================
// PPU Address Map
// ========================================

/// First nametable address
pub(super) const NAMETABLE_BASE: u16 = 0x2000;

/// Start of the third nametable; horizontal mirroring folds at this point
pub(super) const NAMETABLE_2: u16 = 0x2800;

/// Start of the palette window
pub(super) const PALETTE_BASE: u16 = 0x3F00;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU dots per scanline
pub const DOTS_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU dots per even frame (NTSC)
/// 341 dots/scanline × 262 scanlines = 89,342 dots
pub const DOTS_PER_FRAME: u32 = (DOTS_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Visible picture width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Visible picture height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render (idle) scanline
pub(super) const POSTRENDER_SCANLINE: u16 = 240;

/// Scanline on which VBlank starts
pub(super) const VBLANK_SCANLINE: u16 = 241;

/// Pre-render scanline number
/// This is scanline 261 (or -1 in some documentation)
pub(super) const PRERENDER_SCANLINE: u16 = 261;

// ========================================
// Register Bits
// ========================================

pub(super) const CTRL_NAMETABLE: u8 = 0x03;
pub(super) const CTRL_VRAM_INC_32: u8 = 0x04;
pub(super) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(super) const CTRL_BG_TABLE: u8 = 0x10;
pub(super) const CTRL_SPRITE_SIZE_16: u8 = 0x20;
pub(super) const CTRL_NMI_ENABLE: u8 = 0x80;

pub(super) const MASK_GREYSCALE: u8 = 0x01;
pub(super) const MASK_SHOW_BG_LEFT: u8 = 0x02;
pub(super) const MASK_SHOW_SPRITES_LEFT: u8 = 0x04;
pub(super) const MASK_SHOW_BG: u8 = 0x08;
pub(super) const MASK_SHOW_SPRITES: u8 = 0x10;

pub(super) const STATUS_SPRITE_OVERFLOW: u8 = 0x20;
pub(super) const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
pub(super) const STATUS_VBLANK: u8 = 0x80;
