//! PPU unit tests
//!
//! Engine-level tests driven through the register interface and `step`,
//! organized by functionality. Bus, scroll and event-table tests live next
//! to their modules.

use super::*;
use crate::cartridge::{create_mapper, share, Cartridge, Mirroring};
use crate::config::PpuConfig;

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helper Functions
// ========================================

/// Cartridge with CHR-RAM so tests can draw their own tiles
pub(crate) fn create_test_cartridge_chr_ram() -> Cartridge {
    Cartridge::new(vec![0xAA; 16 * 1024], Vec::new(), 0, Mirroring::Horizontal)
}

/// Cartridge with CHR-ROM; byte i holds (i >> 4)
pub(crate) fn create_test_cartridge_chr_rom() -> Cartridge {
    let chr_rom = (0..8 * 1024).map(|i| (i >> 4) as u8).collect();
    Cartridge::new(vec![0xAA; 16 * 1024], chr_rom, 0, Mirroring::Vertical)
}

pub(crate) fn create_test_ppu() -> Ppu {
    create_test_ppu_with(create_test_cartridge_chr_ram(), &PpuConfig::default())
}

pub(crate) fn create_test_ppu_with(cartridge: Cartridge, config: &PpuConfig) -> Ppu {
    let mapper = share(create_mapper(cartridge).unwrap());
    Ppu::with_config(mapper, InterruptLine::new(), config)
}

/// Point v at `address` through PPUADDR
pub(crate) fn set_vram_address(ppu: &mut Ppu, address: u16) {
    ppu.write_register(PPUADDR, (address >> 8) as u8).unwrap();
    ppu.write_register(PPUADDR, address as u8).unwrap();
}

/// Write consecutive bytes through PPUDATA
pub(crate) fn write_vram(ppu: &mut Ppu, address: u16, data: &[u8]) {
    set_vram_address(ppu, address);
    for &byte in data {
        ppu.write_register(PPUDATA, byte).unwrap();
    }
}

/// Make `tile` in the pattern table at `table` a solid block of pixel value 1
pub(crate) fn draw_solid_tile(ppu: &mut Ppu, table: u16, tile: u8) {
    write_vram(ppu, table + tile as u16 * 16, &[0xFF; 8]);
}

/// Step until the PPU is about to execute (scanline, dot)
pub(crate) fn run_to(ppu: &mut Ppu, scanline: u16, dot: u16) {
    for _ in 0..2 * DOTS_PER_FRAME {
        if ppu.scanline() == scanline && ppu.dot() == dot {
            return;
        }
        ppu.step();
    }
    panic!("never reached scanline {} dot {}", scanline, dot);
}

/// Step until the current frame completes
///
/// # Returns
///
/// Number of dots executed
pub(crate) fn run_frame(ppu: &mut Ppu) -> u32 {
    let mut dots = 1;
    while !ppu.step() {
        dots += 1;
        assert!(dots <= DOTS_PER_FRAME, "frame did not complete");
    }
    dots
}

/// OAM image with every sprite parked below the screen
pub(crate) fn empty_oam() -> [u8; 256] {
    let mut oam = [0u8; 256];
    for sprite in oam.chunks_exact_mut(4) {
        sprite[0] = 0xFF;
    }
    oam
}

// ========================================
// Test Modules
// ========================================

mod quirks;
mod rendering;
