//! Bitmaps
//!
//! A bitmap is a width x height grid of packed pixels in one `PixelFormat`.
//! Pixels are stored `bpp / 8` bytes each, little-endian, rows back to back.
//!
//! The pixel memory is either owned by the bitmap or borrowed from someone
//! else (typically a display's mapped surface). Borrowed memory is tied to the
//! bitmap's lifetime parameter, so a view can never outlive or free it.

mod blit;

pub use blit::{Orientation, Rect};

use crate::error::BitmapError;
use crate::pixel::convert::{decode, encode};
use crate::pixel::{Pixel, PixelFormat};

/// Where a bitmap's pixels live
#[derive(Debug)]
enum Storage<'a> {
    /// Allocated by the bitmap, freed when wiped or dropped
    Owned(Vec<u8>),
    /// Foreign memory; never freed by the bitmap
    Borrowed(&'a mut [u8]),
    /// Owned memory that has already been wiped
    Released,
}

/// Rectangular pixel buffer tagged with its format.
#[derive(Debug)]
pub struct Bitmap<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    storage: Storage<'a>,
}

/// Bytes needed for a `width` x `height` bitmap in `format`, if it fits in memory.
fn byte_size(format: &PixelFormat, width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(format.bytes_per_pixel())
}

fn check_dimensions(width: u32, height: u32) -> Result<(), BitmapError> {
    if width == 0 || height == 0 {
        return Err(BitmapError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Read one little-endian packed pixel from the start of `bytes`
#[inline]
pub(crate) fn load(bytes: &[u8], bytes_per_pixel: usize) -> Pixel {
    let mut raw = [0u8; 4];
    raw[..bytes_per_pixel].copy_from_slice(&bytes[..bytes_per_pixel]);
    u32::from_le_bytes(raw)
}

/// Write one little-endian packed pixel at the start of `bytes`
#[inline]
pub(crate) fn store(bytes: &mut [u8], bytes_per_pixel: usize, pixel: Pixel) {
    bytes[..bytes_per_pixel].copy_from_slice(&pixel.to_le_bytes()[..bytes_per_pixel]);
}

impl Bitmap<'static> {
    /// Allocate a zero-filled bitmap that owns its memory.
    ///
    /// Allocation failure is reported as `BitmapError::OutOfMemory`
    /// instead of aborting the process.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self, BitmapError> {
        check_dimensions(width, height)?;
        let bytes = byte_size(&format, width, height).ok_or(BitmapError::OutOfMemory {
            bytes: usize::MAX,
        })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| BitmapError::OutOfMemory { bytes })?;
        pixels.resize(bytes, 0);

        log::debug!(
            "allocated {}x{} bitmap ({} bpp, {} bytes)",
            width,
            height,
            format.bpp(),
            bytes
        );
        Ok(Self {
            width,
            height,
            format,
            storage: Storage::Owned(pixels),
        })
    }

    /// Take ownership of pixel data produced elsewhere (an image decoder,
    /// a font rasterizer). Extra trailing bytes are dropped.
    pub fn from_vec(
        format: PixelFormat,
        width: u32,
        height: u32,
        mut pixels: Vec<u8>,
    ) -> Result<Self, BitmapError> {
        check_dimensions(width, height)?;
        let needed = byte_size(&format, width, height).ok_or(BitmapError::OutOfMemory {
            bytes: usize::MAX,
        })?;
        if pixels.len() < needed {
            return Err(BitmapError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        pixels.truncate(needed);
        Ok(Self {
            width,
            height,
            format,
            storage: Storage::Owned(pixels),
        })
    }
}

impl<'a> Bitmap<'a> {
    /// Wrap externally managed memory without taking ownership.
    ///
    /// The bitmap only ever touches the first `memsize()` bytes of `memory`.
    pub fn from_memory(
        format: PixelFormat,
        width: u32,
        height: u32,
        memory: &'a mut [u8],
    ) -> Result<Self, BitmapError> {
        check_dimensions(width, height)?;
        let needed = byte_size(&format, width, height).ok_or(BitmapError::OutOfMemory {
            bytes: usize::MAX,
        })?;
        if memory.len() < needed {
            return Err(BitmapError::BufferTooSmall {
                needed,
                actual: memory.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            storage: Storage::Borrowed(&mut memory[..needed]),
        })
    }

    /// Release owned pixel memory.
    ///
    /// Wiping twice is a no-op, and so is wiping a borrowed view: foreign
    /// memory stays untouched and the view remains usable.
    pub fn wipe(&mut self) {
        if let Storage::Owned(_) = self.storage {
            log::trace!("wiping {}x{} bitmap", self.width, self.height);
            self.storage = Storage::Released;
        }
    }

    /// True when the bitmap owns its memory (or did, before being wiped)
    pub fn is_owner(&self) -> bool {
        !matches!(self.storage, Storage::Borrowed(_))
    }

    pub fn is_wiped(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Size of the pixel data in bytes
    pub fn memsize(&self) -> usize {
        self.line_size() * self.height as usize
    }

    /// Size of one row of pixels in bytes
    pub fn line_size(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Raw pixel bytes. Empty once wiped.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(pixels) => pixels,
            Storage::Borrowed(memory) => memory,
            Storage::Released => &[],
        }
    }

    /// Mutable raw pixel bytes. Empty once wiped.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Owned(pixels) => pixels,
            Storage::Borrowed(memory) => memory,
            Storage::Released => &mut [],
        }
    }

    /// Consume the bitmap, keeping its pixel bytes.
    /// Owned memory is handed over as is; a borrowed view is copied.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(pixels) => pixels,
            Storage::Borrowed(memory) => memory.to_vec(),
            Storage::Released => Vec::new(),
        }
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    /// Byte offset of pixel (x, y), for in-bounds coordinates
    #[inline]
    fn byte_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.line_size() + x as usize * self.format.bytes_per_pixel()
    }

    /// Bytes of row `y`; empty once wiped
    #[inline]
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let line = self.line_size();
        self.as_bytes().get(y * line..(y + 1) * line).unwrap_or(&[])
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let line = self.line_size();
        match self.as_bytes_mut().get_mut(y * line..(y + 1) * line) {
            Some(row) => row,
            None => &mut [],
        }
    }

    /// Read a raw pixel in the bitmap's own format.
    /// Returns None if out of bounds (or wiped).
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = self.byte_index(x as u32, y as u32);
        self.as_bytes().get(idx..idx + bpp).map(|bytes| load(bytes, bpp))
    }

    /// Write a raw pixel already encoded in the bitmap's format.
    /// Out of bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if !self.in_bounds(x, y) {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = self.byte_index(x as u32, y as u32);
        if let Some(bytes) = self.as_bytes_mut().get_mut(idx..idx + bpp) {
            store(bytes, bpp, pixel);
        }
    }

    /// Read a pixel as canonical RGBA32
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        self.pixel(x, y).map(|p| decode(&self.format, p))
    }

    /// Write a canonical RGBA32 color, converting it to the bitmap's format.
    /// Out of bounds writes are ignored.
    ///
    /// Converts on every call; prefer the primitives or `clear` for bulk work.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Pixel) {
        let pixel = encode(&self.format, color);
        self.set_pixel(x, y, pixel);
    }

    /// Fill every pixel with a canonical RGBA32 color
    pub fn clear(&mut self, color: Pixel) {
        let bpp = self.format.bytes_per_pixel();
        let packed = encode(&self.format, color).to_le_bytes();
        for chunk in self.as_bytes_mut().chunks_exact_mut(bpp) {
            chunk.copy_from_slice(&packed[..bpp]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{rgb, rgba};

    #[test]
    fn test_new_is_zeroed_and_sized() {
        let bmp = Bitmap::new(PixelFormat::RGB24, 5, 3).unwrap();
        assert_eq!(bmp.memsize(), 5 * 3 * 3);
        assert_eq!(bmp.line_size(), 15);
        assert_eq!(bmp.as_bytes().len(), bmp.memsize());
        assert!(bmp.as_bytes().iter().all(|&b| b == 0));
        assert!(bmp.is_owner());
    }

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert_eq!(
            Bitmap::new(PixelFormat::RGB565, 0, 4).unwrap_err(),
            BitmapError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_new_reports_out_of_memory() {
        let err = Bitmap::new(PixelFormat::ARGB32, u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, BitmapError::OutOfMemory { .. }));
    }

    #[test]
    fn test_put_pixel_encodes_and_ignores_out_of_bounds() {
        let mut bmp = Bitmap::new(PixelFormat::RGB565, 4, 4).unwrap();
        bmp.put_pixel(1, 2, rgb(255, 0, 0));
        bmp.put_pixel(-1, 0, rgb(255, 255, 255));
        bmp.put_pixel(4, 0, rgb(255, 255, 255));
        bmp.put_pixel(0, 4, rgb(255, 255, 255));
        assert_eq!(bmp.pixel(1, 2), Some(0xF800));
        let lit = bmp.as_bytes().chunks(2).filter(|c| **c != [0, 0]).count();
        assert_eq!(lit, 1);
        assert_eq!(bmp.pixel(4, 0), None);
    }

    #[test]
    fn test_pixels_are_little_endian_packed() {
        let mut bmp = Bitmap::new(PixelFormat::RGB24, 2, 1).unwrap();
        bmp.set_pixel(1, 0, 0x112233);
        assert_eq!(bmp.as_bytes(), &[0, 0, 0, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut bmp = Bitmap::new(PixelFormat::ARGB32, 3, 2).unwrap();
        bmp.clear(rgba(1, 2, 3, 4));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(bmp.get_pixel(x, y), Some(rgba(1, 2, 3, 4)));
            }
        }
    }

    #[test]
    fn test_wipe_is_idempotent() {
        let mut bmp = Bitmap::new(PixelFormat::RGB565, 2, 2).unwrap();
        bmp.wipe();
        assert!(bmp.is_wiped());
        bmp.wipe();
        assert!(bmp.is_wiped());
        assert!(bmp.as_bytes().is_empty());
        // Further pixel operations are silently ignored
        bmp.put_pixel(0, 0, rgb(1, 1, 1));
        bmp.clear(rgb(1, 1, 1));
        assert_eq!(bmp.pixel(0, 0), None);
    }

    #[test]
    fn test_wipe_leaves_borrowed_memory_alone() {
        let mut memory = vec![0xAAu8; 16];
        {
            let mut view = Bitmap::from_memory(PixelFormat::RGB565, 2, 2, &mut memory).unwrap();
            assert!(!view.is_owner());
            view.wipe();
            assert!(!view.is_wiped());
            view.put_pixel(0, 0, rgb(0, 0, 0));
        }
        assert_eq!(&memory[..2], &[0, 0]);
        assert!(memory[2..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_from_memory_rejects_short_buffer() {
        let mut memory = vec![0u8; 7];
        let err = Bitmap::from_memory(PixelFormat::RGB565, 2, 2, &mut memory).unwrap_err();
        assert_eq!(err, BitmapError::BufferTooSmall { needed: 8, actual: 7 });
    }

    #[test]
    fn test_into_bytes_returns_pixels() {
        let mut bmp = Bitmap::new(PixelFormat::RGB565, 1, 1).unwrap();
        bmp.set_pixel(0, 0, 0x1234);
        assert_eq!(bmp.into_bytes(), vec![0x34, 0x12]);
    }

    #[test]
    fn test_from_vec_adopts_buffer() {
        let bmp = Bitmap::from_vec(PixelFormat::ABGR32, 1, 1, vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(bmp.memsize(), 4);
        assert_eq!(bmp.get_pixel(0, 0), Some(rgba(1, 2, 3, 4)));
    }
}
