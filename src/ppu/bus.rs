// PPU bus - nametable/palette RAM and pattern-table routing
//
// PPU address map:
// - $0000-$1FFF: pattern tables, forwarded to the cartridge mapper
// - $2000-$2FFF: four logical nametables backed by 2KB of internal RAM
// - $3000-$3EFF: mirror of $2000-$2EFF
// - $3F00-$3FFF: 32 bytes of palette RAM, mirrored every 32 bytes

use super::constants::{
    NAMETABLE_2, NAMETABLE_BASE, NAMETABLE_RAM_SIZE, NAMETABLE_SIZE, PALETTE_BASE, PALETTE_SIZE,
};
use crate::cartridge::{BusFault, Mirroring, SharedMapper};

/// Mirror a PPU address onto its canonical address
///
/// The result is the lowest address that aliases the same storage:
/// - Palette addresses wrap modulo 32; $3F10/$3F14/$3F18/$3F1C fold onto
///   $3F00/$3F04/$3F08/$3F0C.
/// - Nametable addresses wrap modulo the 4KB window, then fold by the
///   mirroring mode onto $2000-$23FF and one other 1KB table.
/// - Pattern addresses are returned unchanged.
///
/// The function is total and idempotent.
pub fn mirror_address(address: u16, mirroring: Mirroring) -> u16 {
    let address = address & 0x3FFF;

    if address >= PALETTE_BASE {
        let offset = (address - PALETTE_BASE) % PALETTE_SIZE as u16;
        // Sprite palette entry 0 is the same cell as the background entry
        if offset >= 0x10 && offset % 4 == 0 {
            PALETTE_BASE + offset - 0x10
        } else {
            PALETTE_BASE + offset
        }
    } else if address >= NAMETABLE_BASE {
        let offset = (address - NAMETABLE_BASE) % (4 * NAMETABLE_SIZE);
        match mirroring {
            Mirroring::Vertical => NAMETABLE_BASE + offset % (2 * NAMETABLE_SIZE),
            Mirroring::Horizontal => {
                if offset < 2 * NAMETABLE_SIZE {
                    NAMETABLE_BASE + offset % NAMETABLE_SIZE
                } else {
                    NAMETABLE_2 + offset % NAMETABLE_SIZE
                }
            }
        }
    } else {
        address
    }
}

/// Storage cell an address resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Pattern space, handled by the mapper
    Pattern(u16),
    /// Offset into nametable RAM
    Nametable(usize),
    /// Offset into palette RAM
    Palette(usize),
}

/// PPU-side memory bus
pub struct PpuBus {
    /// 2KB of internal nametable RAM
    nametables: [u8; NAMETABLE_RAM_SIZE],

    /// Palette RAM
    palette_ram: [u8; PALETTE_SIZE],

    /// Nametable mirroring, fixed by the cartridge
    mirroring: Mirroring,

    /// Cartridge mapper for pattern-table accesses
    mapper: SharedMapper,
}

impl PpuBus {
    /// Create a bus over a cartridge mapper
    pub fn new(mapper: SharedMapper) -> Self {
        let mirroring = mapper.borrow().mirroring();
        PpuBus {
            nametables: [0; NAMETABLE_RAM_SIZE],
            palette_ram: [0; PALETTE_SIZE],
            mirroring,
            mapper,
        }
    }

    /// Zero nametable and palette RAM
    pub fn reset(&mut self) {
        self.nametables.fill(0);
        self.palette_ram.fill(0);
    }

    /// Nametable mirroring in effect
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn locate(&self, address: u16) -> Slot {
        let canonical = mirror_address(address, self.mirroring);

        if canonical >= PALETTE_BASE {
            Slot::Palette((canonical - PALETTE_BASE) as usize)
        } else if canonical >= NAMETABLE_2 {
            // Only horizontal mirroring lands here: second physical table
            Slot::Nametable((canonical - NAMETABLE_2 + NAMETABLE_SIZE) as usize)
        } else if canonical >= NAMETABLE_BASE {
            Slot::Nametable((canonical - NAMETABLE_BASE) as usize)
        } else {
            Slot::Pattern(canonical)
        }
    }

    /// Read a byte from PPU address space
    pub fn read(&self, address: u16) -> u8 {
        match self.locate(address) {
            Slot::Pattern(address) => self.mapper.borrow().read_ppu(address),
            Slot::Nametable(index) => self.nametables[index],
            Slot::Palette(index) => self.palette_ram[index],
        }
    }

    /// Write a byte to PPU address space
    ///
    /// # Errors
    ///
    /// Returns `BusFault::ReadOnly` when the write targets CHR-ROM.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), BusFault> {
        match self.locate(address) {
            Slot::Pattern(address) => self.mapper.borrow_mut().write_ppu(address, value)?,
            Slot::Nametable(index) => self.nametables[index] = value,
            Slot::Palette(index) => self.palette_ram[index] = value,
        }
        Ok(())
    }

    /// Read a palette RAM entry by its 5-bit offset
    pub fn palette_entry(&self, address: u16) -> u8 {
        self.read(PALETTE_BASE | (address & 0x1F))
    }
}
