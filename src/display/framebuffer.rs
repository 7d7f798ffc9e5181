//! Headless framebuffer
//!
//! Stands in for a mapped display device: one block of device memory in the
//! native pixel format. Drawing code never owns that memory; it borrows it
//! through [`Framebuffer::view`], which returns a non-owning `Bitmap`.

use std::fs;
use std::path::Path;

use crate::bitmap::Bitmap;
use crate::config::DisplayConfig;
use crate::error::{BitmapError, DisplayError};
use crate::pixel::PixelFormat;

pub struct Framebuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    memory: Vec<u8>,
}

impl Framebuffer {
    /// Allocate zeroed device memory for a `width` x `height` surface
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self, DisplayError> {
        // Allocate through Bitmap so size checks and OOM reporting match
        let memory = Bitmap::new(format, width, height)?.into_bytes();
        log::info!(
            "framebuffer {}x{}, {} bpp, {} bytes",
            width,
            height,
            format.bpp(),
            memory.len()
        );
        Ok(Self {
            width,
            height,
            format,
            memory,
        })
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let format = config.format.to_format()?;
        Self::new(format, config.width, config.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Device memory as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }

    /// Non-owning bitmap over the device memory
    pub fn view(&mut self) -> Result<Bitmap<'_>, BitmapError> {
        Bitmap::from_memory(self.format, self.width, self.height, &mut self.memory)
    }

    /// Copy a back buffer onto the surface, converting if its format differs
    pub fn present(&mut self, frame: &Bitmap<'_>) -> Result<(), BitmapError> {
        let mut view = self.view()?;
        view.blit(frame, 0, 0);
        Ok(())
    }

    /// Write the raw surface memory to `path`
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), DisplayError> {
        let path = path.as_ref();
        fs::write(path, &self.memory)?;
        log::info!("dumped {} bytes to {}", self.memory.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{rgb, ChannelSpan};

    #[test]
    fn test_view_writes_through_to_device_memory() {
        let mut fb = Framebuffer::new(PixelFormat::RGB565, 4, 2).unwrap();
        {
            let mut view = fb.view().unwrap();
            assert!(!view.is_owner());
            view.put_pixel(1, 0, rgb(255, 0, 0));
            // Wiping a view never releases device memory
            view.wipe();
        }
        assert_eq!(fb.as_bytes().len(), 16);
        assert_eq!(&fb.as_bytes()[2..4], &[0x00, 0xF8]);
    }

    #[test]
    fn test_present_converts_back_buffer() {
        let mut fb = Framebuffer::new(PixelFormat::BGR24, 2, 2).unwrap();
        let mut back = Bitmap::new(PixelFormat::ARGB32, 2, 2).unwrap();
        back.clear(rgb(1, 2, 3));
        fb.present(&back).unwrap();
        for pixel in fb.as_bytes().chunks_exact(3) {
            assert_eq!(pixel, &[1, 2, 3]);
        }
    }

    #[test]
    fn test_from_config_rejects_bad_format() {
        let mut config = DisplayConfig::default();
        config.format.bits_per_pixel = 12;
        config.format.red = ChannelSpan::new(8, 4);
        assert!(matches!(
            Framebuffer::from_config(&config),
            Err(DisplayError::Format(_))
        ));
    }

    #[test]
    fn test_dump_writes_raw_memory() {
        let mut fb = Framebuffer::new(PixelFormat::RGB24, 1, 1).unwrap();
        fb.view().unwrap().put_pixel(0, 0, rgb(0xAA, 0xBB, 0xCC));
        let path = std::env::temp_dir().join(format!("rasterfb-dump-{}.raw", std::process::id()));
        fb.dump(&path).unwrap();
        let bytes = fs::read(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(bytes, vec![0xCC, 0xBB, 0xAA]);
    }
}
