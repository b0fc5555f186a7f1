// Screenshot functionality
//
// Saves the PPU color buffer (or its visible picture) as a PNG file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ScreenshotConfig;
use crate::ppu::{Ppu, Rgb, DOTS_PER_SCANLINE, SCANLINES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Errors that can occur during screenshot operations
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("Expected {expected} pixels for the image size, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Save a screenshot of the PPU output
///
/// With `crop_to_visible` the 256×240 picture is saved, otherwise the whole
/// 341×262 dot grid including the blanking cells.
///
/// # Returns
///
/// The path of the written file
///
/// # Example
///
/// ```no_run
/// use nes_ppu::cartridge::{create_mapper, share, Cartridge, Mirroring};
/// use nes_ppu::config::ScreenshotConfig;
/// use nes_ppu::interrupt::InterruptLine;
/// use nes_ppu::ppu::Ppu;
/// use nes_ppu::screenshot::save_screenshot;
///
/// let cart = Cartridge::new(vec![0; 0x4000], vec![0; 0x2000], 0, Mirroring::Vertical);
/// let mapper = share(create_mapper(cart).unwrap());
/// let ppu = Ppu::new(mapper, InterruptLine::new());
///
/// let path = save_screenshot(&ppu, &ScreenshotConfig::default()).expect("Failed to save screenshot");
/// println!("Screenshot saved to: {}", path.display());
/// ```
pub fn save_screenshot(ppu: &Ppu, config: &ScreenshotConfig) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(&config.directory)?;
    let file_path = config
        .directory
        .join(screenshot_filename(ppu.frame_count(), config.include_timestamp));

    if config.crop_to_visible {
        let frame = ppu.visible_frame();
        save_png(&file_path, &frame, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)?;
    } else {
        save_png(
            &file_path,
            ppu.color_buffer(),
            DOTS_PER_SCANLINE as u32,
            SCANLINES_PER_FRAME as u32,
        )?;
    }

    log::info!("Saved screenshot to {}", file_path.display());
    Ok(file_path)
}

fn screenshot_filename(frame: u64, include_timestamp: bool) -> String {
    if include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("screenshot_{}_f{}.png", timestamp, frame)
    } else {
        format!("screenshot_f{}.png", frame)
    }
}

/// Write RGB pixels as an 8-bit PNG
///
/// # Arguments
///
/// * `path` - Path to save the PNG file
/// * `pixels` - Row-major pixels, `width × height` of them
/// * `width` - Image width
/// * `height` - Image height
///
/// # Errors
///
/// Returns `ScreenshotError::SizeMismatch` when `pixels` does not hold exactly
/// `width × height` entries; nothing is written in that case.
pub fn save_png(path: &Path, pixels: &[Rgb], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(ScreenshotError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let data: Vec<u8> = pixels.iter().flat_map(|pixel| pixel.to_bytes()).collect();

    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nes_ppu_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_filename_without_timestamp() {
        assert_eq!(screenshot_filename(12, false), "screenshot_f12.png");
    }

    #[test]
    fn test_filename_with_timestamp() {
        let name = screenshot_filename(3, true);
        assert!(name.starts_with("screenshot_"));
        assert!(name.ends_with("_f3.png"));
    }

    #[test]
    fn test_save_png_writes_png_signature() {
        let dir = temp_dir("png");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.png");

        let pixels = vec![Rgb::from_u32(0xFF8000); 4 * 2];
        save_png(&path, &pixels, 4, 2).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_png_size_mismatch_rejected() {
        let dir = temp_dir("mismatch");
        let path = dir.join("never_written.png");
        let pixels = vec![Rgb::default(); 3];

        let result = save_png(&path, &pixels, 2, 2);

        assert!(matches!(
            result,
            Err(ScreenshotError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(!path.exists());
    }
}
