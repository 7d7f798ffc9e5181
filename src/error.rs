//! Error types for the raster engine.
//!
//! Only recoverable conditions live here. Unknown format ids are programmer
//! errors and panic; out-of-bounds drawing is silently clipped.

use crate::pixel::Channel;

/// Errors raised while validating a pixel format descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Only 8, 16, 24 and 32 bits per pixel are supported.
    #[error("unsupported color depth: {0} bits per pixel")]
    UnsupportedDepth(u32),

    /// A channel span does not fit inside the pixel.
    #[error("{channel:?} channel (offset {offset}, width {width}) exceeds {bpp} bits per pixel")]
    ChannelOutOfRange {
        channel: Channel,
        offset: u32,
        width: u32,
        bpp: u32,
    },

    /// Two present channels share bits.
    #[error("{0:?} and {1:?} channels overlap")]
    Overlap(Channel, Channel),
}

/// Errors raised while creating a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    /// The pixel buffer could not be allocated.
    #[error("out of memory: cannot allocate {bytes} bytes of pixel data")]
    OutOfMemory { bytes: usize },

    /// Width and height must both be non-zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Foreign memory handed to a view is smaller than the bitmap needs.
    #[error("buffer too small: {actual} bytes given, {needed} bytes needed")]
    BufferTooSmall { needed: usize, actual: usize },
}

/// Errors raised while loading or saving engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid display format: {0}")]
    Format(#[from] FormatError),
}

/// Errors raised by the display surface.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("invalid display format: {0}")]
    Format(#[from] FormatError),

    #[error("cannot map display memory: {0}")]
    Bitmap(#[from] BitmapError),

    #[error("framebuffer dump failed: {0}")]
    Io(#[from] std::io::Error),
}
