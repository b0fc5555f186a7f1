// Mappers module - mapper factory and individual mapper implementations
//
// Each mapper translates cartridge-relative CPU and PPU addresses for one
// board type. Additional boards are new implementations of `Mapper`.

mod mapper0;

pub use mapper0::Mapper0;

use thiserror::Error;

use super::{Cartridge, Mapper};

/// Cartridge configuration error
///
/// These are fatal and detected before the PPU is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// The requested mapper number is not supported
    #[error("Mapper {0} is not supported")]
    UnsupportedMapper(u8),

    /// The header carried a mirroring tag no board uses
    #[error("Invalid mirroring tag {0}")]
    InvalidMirroring(u8),

    /// Invalid cartridge configuration for the mapper
    #[error("Invalid mapper configuration: {0}")]
    InvalidConfiguration(String),
}

/// Create a mapper instance based on the mapper number in the cartridge
///
/// # Errors
///
/// Returns `MapperError::UnsupportedMapper` if the mapper number is not
/// implemented, or `MapperError::InvalidConfiguration` if the image does not
/// fit the board.
///
/// # Example
///
/// ```
/// use nes_ppu::cartridge::{create_mapper, Cartridge, Mirroring};
///
/// let cartridge = Cartridge::new(vec![0; 16 * 1024], vec![0; 8 * 1024], 0, Mirroring::Vertical);
/// let mapper = create_mapper(cartridge).unwrap();
/// assert_eq!(mapper.mapper_id(), 0);
/// ```
pub fn create_mapper(cartridge: Cartridge) -> Result<Box<dyn Mapper>, MapperError> {
    let mapper: Box<dyn Mapper> = match cartridge.mapper {
        0 => Box::new(Mapper0::new(cartridge)?),
        mapper_num => return Err(MapperError::UnsupportedMapper(mapper_num)),
    };

    log::info!(
        "Created mapper {} ({} mirroring)",
        mapper.mapper_id(),
        mapper.mirroring()
    );
    Ok(mapper)
}
