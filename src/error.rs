// Crate-level error type
//
// Groups the fatal error categories a driver has to tell apart: cartridge
// configuration problems (raised before the PPU starts) and illegal cartridge
// accesses (raised while running).

use thiserror::Error;

use crate::cartridge::{BusFault, MapperError};
use crate::config::ConfigError;
use crate::screenshot::ScreenshotError;

/// Any error produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Unsupported or malformed cartridge
    #[error(transparent)]
    Mapper(#[from] MapperError),

    /// Write into read-only cartridge memory, or an undecoded access
    #[error(transparent)]
    Bus(#[from] BusFault),

    /// Configuration file problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Screenshot could not be written
    #[error(transparent)]
    Screenshot(#[from] ScreenshotError),
}

impl Error {
    /// Whether this error was detected at construction time
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Mapper(_) | Error::Config(_))
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, Error>;
