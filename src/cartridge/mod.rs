// Cartridge module - cartridge image and the mapper contract
//
// The cartridge image (PRG/CHR bytes, mirroring, mapper number) is produced by
// an external loader. Mappers take ownership of the image and translate CPU
// and PPU cartridge-relative addresses into locations inside it.

pub mod mappers;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

pub use mappers::{create_mapper, Mapper0, MapperError};

/// Size of one PRG-ROM bank (16KB)
pub const PRG_BANK_SIZE: usize = 16 * 1024;

/// Size of one CHR bank (8KB)
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// Nametable mirroring mode, hard-wired on the cartridge board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400, $2800=$2C00 (vertical scrolling games)
    Horizontal,
    /// $2000=$2800, $2400=$2C00 (horizontal scrolling games)
    Vertical,
}

impl TryFrom<u8> for Mirroring {
    type Error = MapperError;

    /// Decode the header mirroring tag (0 = horizontal, 1 = vertical)
    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Mirroring::Horizontal),
            1 => Ok(Mirroring::Vertical),
            other => Err(MapperError::InvalidMirroring(other)),
        }
    }
}

impl fmt::Display for Mirroring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mirroring::Horizontal => write!(f, "horizontal"),
            Mirroring::Vertical => write!(f, "vertical"),
        }
    }
}

/// Cartridge image as handed over by the loader
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// PRG-ROM data
    pub prg_rom: Vec<u8>,
    /// CHR-ROM data (empty when the board carries CHR-RAM)
    pub chr_rom: Vec<u8>,
    /// Mapper number from the header
    pub mapper: u8,
    /// Hard-wired nametable mirroring
    pub mirroring: Mirroring,
}

impl Cartridge {
    /// Create a cartridge image from already-parsed parts
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mapper: u8, mirroring: Mirroring) -> Self {
        Cartridge {
            prg_rom,
            chr_rom,
            mapper,
            mirroring,
        }
    }

    /// Whether the board uses CHR-RAM instead of CHR-ROM
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

/// Which bus an access came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusSide {
    Cpu,
    Ppu,
}

impl fmt::Display for BusSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusSide::Cpu => write!(f, "CPU"),
            BusSide::Ppu => write!(f, "PPU"),
        }
    }
}

/// Result of translating a cartridge-relative address
///
/// Offsets index directly into the mapper's backing memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Offset into PRG-ROM
    PrgRom(usize),
    /// Offset into CHR-ROM
    ChrRom(usize),
    /// Offset into CHR-RAM
    ChrRam(usize),
}

impl Location {
    /// Whether a write to this location is allowed
    pub fn is_writable(self) -> bool {
        matches!(self, Location::ChrRam(_))
    }
}

/// Illegal cartridge access
///
/// Well-formed software never writes into ROM on these boards, so a write
/// attempt means a corrupt program image or a missing mapper feature. The
/// driver must stop rather than keep running with diverged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusFault {
    /// Write into a read-only region
    #[error("{side} write of ${value:02X} to read-only cartridge address ${address:04X}")]
    ReadOnly { side: BusSide, address: u16, value: u8 },

    /// Access to an address the mapper does not decode
    #[error("{side} access to unmapped cartridge address ${address:04X}")]
    Unmapped { side: BusSide, address: u16 },
}

/// Cartridge address translation
///
/// Every mapper variant implements the same contract for both buses. The
/// translate functions are pure; reads and writes are built on top of them.
pub trait Mapper {
    /// Mapper number (e.g., 0 for NROM)
    fn mapper_id(&self) -> u8;

    /// Hard-wired (or current) nametable mirroring
    fn mirroring(&self) -> Mirroring;

    /// Translate a CPU address in cartridge space
    fn translate_cpu(&self, address: u16) -> Result<Location, BusFault>;

    /// Translate a PPU address in pattern-table space ($0000-$1FFF)
    ///
    /// Addresses above the pattern region are folded into it; the PPU bus
    /// never forwards them.
    fn translate_ppu(&self, address: u16) -> Location;

    /// Read the byte at a translated location
    fn fetch(&self, location: Location) -> u8;

    /// Store a byte at a writable location
    fn store(&mut self, location: Location, value: u8);

    /// Read from CPU address space
    fn read_cpu(&self, address: u16) -> Result<u8, BusFault> {
        self.translate_cpu(address).map(|location| self.fetch(location))
    }

    /// Write to CPU address space
    fn write_cpu(&mut self, address: u16, value: u8) -> Result<(), BusFault> {
        let location = self.translate_cpu(address).inspect_err(|fault| {
            log::warn!("Refused CPU write ${:02X}: {}", value, fault);
        })?;
        if !location.is_writable() {
            log::warn!("Refused CPU write ${:02X} to ROM at ${:04X}", value, address);
            return Err(BusFault::ReadOnly {
                side: BusSide::Cpu,
                address,
                value,
            });
        }
        self.store(location, value);
        Ok(())
    }

    /// Read from PPU pattern space; pattern reads have no side effects
    fn read_ppu(&self, address: u16) -> u8 {
        self.fetch(self.translate_ppu(address))
    }

    /// Write to PPU pattern space
    fn write_ppu(&mut self, address: u16, value: u8) -> Result<(), BusFault> {
        let location = self.translate_ppu(address);
        if !location.is_writable() {
            log::warn!("Refused PPU write ${:02X} to CHR-ROM at ${:04X}", value, address);
            return Err(BusFault::ReadOnly {
                side: BusSide::Ppu,
                address,
                value,
            });
        }
        self.store(location, value);
        Ok(())
    }
}

/// Mapper handle shared between the CPU bus and the PPU bus
pub type SharedMapper = Rc<RefCell<Box<dyn Mapper>>>;

/// Wrap a mapper for sharing between both buses
pub fn share(mapper: Box<dyn Mapper>) -> SharedMapper {
    Rc::new(RefCell::new(mapper))
}
