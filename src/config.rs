// Configuration management
//
// PPU behavior switches and screenshot settings, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file path
const CONFIG_FILE: &str = "ppu_config.toml";

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// PPU configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpuConfig {
    /// Sprite evaluation settings
    pub sprites: SpriteConfig,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
}

/// Sprite evaluation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// How the sprite overflow flag is detected
    pub overflow: SpriteOverflow,
}

/// Sprite overflow detection algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteOverflow {
    /// Set the flag when a ninth in-range sprite exists on the line
    #[default]
    Exact,

    /// Reproduce the 2C02's buggy diagonal OAM scan, with its false
    /// positives and negatives
    Hardware,
}

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,

    /// Save only the 256×240 picture instead of the full dot grid
    pub crop_to_visible: bool,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        ScreenshotConfig {
            directory: PathBuf::from("screenshots"),
            include_timestamp: true,
            crop_to_visible: true,
        }
    }
}

impl PpuConfig {
    /// Load configuration from the default file, falling back to defaults
    ///
    /// # Example
    ///
    /// ```
    /// use nes_ppu::config::PpuConfig;
    ///
    /// let config = PpuConfig::load_or_default();
    /// ```
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::debug!("Using default PPU config ({})", e);
            Self::default()
        })
    }

    /// Load configuration from the default file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(CONFIG_FILE)
    }

    /// Load and validate configuration from `path`
    ///
    /// # Errors
    ///
    /// I/O failures, TOML syntax errors, unknown enum values and values
    /// rejected by [`PpuConfig::validate`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: PpuConfig = toml::from_str(&contents)?;
        config.validate()?;

        log::debug!("Loaded PPU config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to `path`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_ppu::config::PpuConfig;
    ///
    /// let config = PpuConfig::default();
    /// config.save_to("ppu_config.toml").expect("Failed to save configuration");
    /// ```
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        log::debug!("Saved PPU config to {}", path.display());
        Ok(())
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screenshot.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "screenshot.directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
