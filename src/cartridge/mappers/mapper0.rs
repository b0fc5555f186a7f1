// Mapper 0 (NROM) - The simplest NES mapper with no bank switching
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM
//
// NROM has no registers, so it is purely combinational: every CPU write is a
// write into ROM and is refused.

use super::MapperError;
use crate::cartridge::{
    BusFault, BusSide, Cartridge, Location, Mapper, Mirroring, CHR_BANK_SIZE, PRG_BANK_SIZE,
};

/// First CPU address decoded by the board
const PRG_WINDOW_START: u16 = 0x8000;

/// Mapper 0 implementation (NROM)
pub struct Mapper0 {
    /// PRG-ROM data (16KB or 32KB)
    prg_rom: Vec<u8>,
    /// CHR-ROM or CHR-RAM data (8KB)
    chr_mem: Vec<u8>,
    /// Whether CHR memory is RAM (writable) or ROM (read-only)
    chr_is_ram: bool,
    /// Mirroring type (fixed, cannot be changed by the mapper)
    mirroring: Mirroring,
}

impl Mapper0 {
    /// Create a new Mapper0 instance from a cartridge
    ///
    /// A cartridge without CHR-ROM gets 8KB of CHR-RAM.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::InvalidConfiguration` if PRG-ROM is not 16KB or
    /// 32KB, or CHR-ROM is present but not 8KB.
    pub fn new(cartridge: Cartridge) -> Result<Self, MapperError> {
        let prg_rom_size = cartridge.prg_rom.len();
        if prg_rom_size != PRG_BANK_SIZE && prg_rom_size != 2 * PRG_BANK_SIZE {
            return Err(MapperError::InvalidConfiguration(format!(
                "Mapper 0 requires 16KB or 32KB PRG-ROM, got {} bytes",
                prg_rom_size
            )));
        }

        let chr_is_ram = cartridge.has_chr_ram();
        let chr_mem = if chr_is_ram {
            vec![0; CHR_BANK_SIZE]
        } else if cartridge.chr_rom.len() == CHR_BANK_SIZE {
            cartridge.chr_rom
        } else {
            return Err(MapperError::InvalidConfiguration(format!(
                "Mapper 0 requires 8KB CHR-ROM, got {} bytes",
                cartridge.chr_rom.len()
            )));
        };

        log::debug!(
            "NROM: {}KB PRG-ROM, 8KB CHR-{}",
            prg_rom_size / 1024,
            if chr_is_ram { "RAM" } else { "ROM" }
        );

        Ok(Mapper0 {
            prg_rom: cartridge.prg_rom,
            chr_mem,
            chr_is_ram,
            mirroring: cartridge.mirroring,
        })
    }
}

impl Mapper for Mapper0 {
    fn mapper_id(&self) -> u8 {
        0
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// $8000-$FFFF map onto PRG-ROM; 16KB images repeat in both halves.
    fn translate_cpu(&self, address: u16) -> Result<Location, BusFault> {
        if address < PRG_WINDOW_START {
            return Err(BusFault::Unmapped {
                side: BusSide::Cpu,
                address,
            });
        }
        let index = (address - PRG_WINDOW_START) as usize;
        Ok(Location::PrgRom(index % self.prg_rom.len()))
    }

    fn translate_ppu(&self, address: u16) -> Location {
        let index = (address & 0x1FFF) as usize;
        if self.chr_is_ram {
            Location::ChrRam(index)
        } else {
            Location::ChrRom(index)
        }
    }

    fn fetch(&self, location: Location) -> u8 {
        match location {
            Location::PrgRom(index) => self.prg_rom[index],
            Location::ChrRom(index) | Location::ChrRam(index) => self.chr_mem[index],
        }
    }

    fn store(&mut self, location: Location, value: u8) {
        match location {
            Location::ChrRam(index) => self.chr_mem[index] = value,
            other => unreachable!("store to read-only location {:?}", other),
        }
    }
}
