// NES PPU Library
// Dot-accurate 2C02 picture processing unit with the cartridge mapper it draws from

// Public modules
pub mod cartridge;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod ppu;
pub mod screenshot;

// Re-export main types for convenience
pub use cartridge::{
    create_mapper, share, BusFault, BusSide, Cartridge, Location, Mapper, MapperError, Mirroring,
    SharedMapper,
};
pub use config::{ConfigError, PpuConfig, ScreenshotConfig, SpriteOverflow};
pub use error::{Error, Result};
pub use interrupt::InterruptLine;
pub use ppu::{Ppu, PpuBus, PpuState, Rgb};
pub use screenshot::{save_screenshot, ScreenshotError};
