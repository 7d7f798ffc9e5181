//! Pixel formats
//!
//! A `PixelFormat` describes how the four color channels are packed into an
//! 8, 16, 24 or 32 bit pixel. Every format is just data (bit offset and bit
//! width per channel), so conversions between any two formats go through the
//! same generic code in [`convert`].
//!
//! Colors cross the public API as canonical RGBA32: red in bits 0-7, green in
//! 8-15, blue in 16-23 and alpha in 24-31.

pub mod convert;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// A pixel value. Its meaning depends on the format it is encoded in.
pub type Pixel = u32;

/// Color-key sentinel (canonical magenta with zero alpha).
/// Masked blits treat source pixels of this color as transparent.
pub const MASK_COLOR: Pixel = 0x00ff00ff;

/// Build a canonical RGBA32 color.
#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Pixel {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Build a canonical RGBA32 color with a zero alpha component.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Pixel {
    rgba(r, g, b, 0)
}

/// Split a canonical RGBA32 color into `[r, g, b, a]`.
#[inline]
pub const fn channels(color: Pixel) -> [u8; 4] {
    [
        color as u8,
        (color >> 8) as u8,
        (color >> 16) as u8,
        (color >> 24) as u8,
    ]
}

// ============================================================================
// Channels
// ============================================================================

/// Color component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    /// Bit position of this channel inside a canonical RGBA32 color
    #[inline]
    pub const fn canonical_shift(self) -> u32 {
        match self {
            Channel::Red => 0,
            Channel::Green => 8,
            Channel::Blue => 16,
            Channel::Alpha => 24,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}

/// Position of one channel inside a packed pixel.
/// A zero width means the format has no such channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChannelSpan {
    pub offset: u32,
    #[serde(alias = "length")]
    pub width: u32,
}

impl ChannelSpan {
    pub const ABSENT: ChannelSpan = ChannelSpan::new(0, 0);

    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    #[inline]
    pub const fn is_present(self) -> bool {
        self.width > 0
    }

    /// Mask of the channel value once shifted down to bit 0
    #[inline]
    pub const fn value_mask(self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Read the channel value (at its native width) out of a pixel
    #[inline]
    pub const fn extract(self, pixel: Pixel) -> u32 {
        if self.width == 0 || self.offset >= 32 {
            return 0;
        }
        (pixel >> self.offset) & self.value_mask()
    }

    /// Position a native-width channel value inside a pixel
    #[inline]
    pub const fn place(self, value: u32) -> Pixel {
        if self.width == 0 || self.offset >= 32 {
            return 0;
        }
        (value & self.value_mask()) << self.offset
    }

    /// Bits covered by this channel inside a pixel
    #[inline]
    const fn pixel_mask(self) -> u64 {
        ((1u64 << self.width) - 1) << self.offset
    }
}

// ============================================================================
// PixelFormat
// ============================================================================

/// Descriptor of a channel-packed pixel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    bpp: u32,
    spans: [ChannelSpan; 4],
}

impl PixelFormat {
    /// 16 bit, red in the high bits (`0xF800` is pure red)
    pub const RGB565: PixelFormat = PixelFormat::known(
        16,
        ChannelSpan::new(11, 5),
        ChannelSpan::new(5, 6),
        ChannelSpan::new(0, 5),
        ChannelSpan::ABSENT,
    );
    pub const RGB24: PixelFormat = PixelFormat::known(
        24,
        ChannelSpan::new(16, 8),
        ChannelSpan::new(8, 8),
        ChannelSpan::new(0, 8),
        ChannelSpan::ABSENT,
    );
    pub const BGR24: PixelFormat = PixelFormat::known(
        24,
        ChannelSpan::new(0, 8),
        ChannelSpan::new(8, 8),
        ChannelSpan::new(16, 8),
        ChannelSpan::ABSENT,
    );
    pub const RGBA32: PixelFormat = PixelFormat::known(
        32,
        ChannelSpan::new(24, 8),
        ChannelSpan::new(16, 8),
        ChannelSpan::new(8, 8),
        ChannelSpan::new(0, 8),
    );
    pub const ARGB32: PixelFormat = PixelFormat::known(
        32,
        ChannelSpan::new(16, 8),
        ChannelSpan::new(8, 8),
        ChannelSpan::new(0, 8),
        ChannelSpan::new(24, 8),
    );
    /// Same layout as the canonical RGBA32 exchange color
    pub const ABGR32: PixelFormat = PixelFormat::known(
        32,
        ChannelSpan::new(0, 8),
        ChannelSpan::new(8, 8),
        ChannelSpan::new(16, 8),
        ChannelSpan::new(24, 8),
    );

    const fn known(
        bpp: u32,
        red: ChannelSpan,
        green: ChannelSpan,
        blue: ChannelSpan,
        alpha: ChannelSpan,
    ) -> Self {
        Self {
            bpp,
            spans: [red, green, blue, alpha],
        }
    }

    /// Build and validate a format, typically one reported by a display device.
    pub fn new(
        bpp: u32,
        red: ChannelSpan,
        green: ChannelSpan,
        blue: ChannelSpan,
        alpha: ChannelSpan,
    ) -> Result<Self, FormatError> {
        if !matches!(bpp, 8 | 16 | 24 | 32) {
            return Err(FormatError::UnsupportedDepth(bpp));
        }
        let format = Self::known(bpp, red, green, blue, alpha);

        for channel in Channel::ALL {
            let span = format.span(channel);
            if span.is_present() && span.offset as u64 + span.width as u64 > bpp as u64 {
                return Err(FormatError::ChannelOutOfRange {
                    channel,
                    offset: span.offset,
                    width: span.width,
                    bpp,
                });
            }
        }

        for (i, &a) in Channel::ALL.iter().enumerate() {
            for &b in &Channel::ALL[i + 1..] {
                let (sa, sb) = (format.span(a), format.span(b));
                if sa.is_present() && sb.is_present() && sa.pixel_mask() & sb.pixel_mask() != 0 {
                    return Err(FormatError::Overlap(a, b));
                }
            }
        }

        Ok(format)
    }

    /// Bits per pixel (8, 16, 24 or 32)
    #[inline]
    pub const fn bpp(&self) -> u32 {
        self.bpp
    }

    /// Bytes used to store one pixel
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.bpp / 8) as usize
    }

    #[inline]
    pub const fn span(&self, channel: Channel) -> ChannelSpan {
        self.spans[channel.index()]
    }

    pub const fn has_alpha(&self) -> bool {
        self.spans[3].is_present()
    }
}

// ============================================================================
// Format table
// ============================================================================

/// Identifier of a well-known pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatId {
    /// Whatever the display device reports, see [`FormatTable`]
    Native,
    Rgb565,
    Rgb24,
    Bgr24,
    Rgba32,
    Argb32,
    Abgr32,
}

impl FormatId {
    pub const ALL: [FormatId; 7] = [
        FormatId::Native,
        FormatId::Rgb565,
        FormatId::Rgb24,
        FormatId::Bgr24,
        FormatId::Rgba32,
        FormatId::Argb32,
        FormatId::Abgr32,
    ];

    /// Map a numeric id (0 = native, then the built-ins in table order).
    ///
    /// # Panics
    /// Panics on an unknown id. Format ids come from code, never from data,
    /// so an unknown one is a bug in the caller.
    pub fn from_raw(raw: u32) -> FormatId {
        assert!(
            (raw as usize) < Self::ALL.len(),
            "unknown pixel format id {}",
            raw
        );
        Self::ALL[raw as usize]
    }

    /// Descriptor of a built-in format; `None` for the native slot.
    pub const fn builtin(self) -> Option<PixelFormat> {
        match self {
            FormatId::Native => None,
            FormatId::Rgb565 => Some(PixelFormat::RGB565),
            FormatId::Rgb24 => Some(PixelFormat::RGB24),
            FormatId::Bgr24 => Some(PixelFormat::BGR24),
            FormatId::Rgba32 => Some(PixelFormat::RGBA32),
            FormatId::Argb32 => Some(PixelFormat::ARGB32),
            FormatId::Abgr32 => Some(PixelFormat::ABGR32),
        }
    }
}

/// Format lookup table with the native (display) format resolved.
///
/// Built once at startup from the display configuration and passed to
/// whoever needs to resolve [`FormatId::Native`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTable {
    native: PixelFormat,
}

impl FormatTable {
    pub fn new(native: PixelFormat) -> Self {
        log::debug!(
            "native pixel format: {} bpp, spans {:?}",
            native.bpp(),
            Channel::ALL.map(|c| native.span(c))
        );
        Self { native }
    }

    #[inline]
    pub fn native(&self) -> PixelFormat {
        self.native
    }

    pub fn get(&self, id: FormatId) -> PixelFormat {
        id.builtin().unwrap_or(self.native)
    }
}

impl Default for FormatTable {
    /// Table whose native slot is ARGB32, the usual 32 bit fbdev layout
    fn default() -> Self {
        Self::new(PixelFormat::ARGB32)
    }
}
