//! Per-pixel combine operations
//!
//! Blits and primitives never write pixels directly. They hand each
//! (destination, source) pair to a `Combine` value, which returns the new
//! destination pixel. Swapping the operation is the only difference between
//! an opaque, a color-keyed and an additive blit or shape.

use crate::pixel::convert::{blend_add, convert, encode};
use crate::pixel::{Pixel, PixelFormat, MASK_COLOR};

/// The pair of formats a pixel travels between.
///
/// Built once per blit or primitive call so the per-pixel work only has to
/// convert (or not) and combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    src: PixelFormat,
    dst: PixelFormat,
    same: bool,
    src_mask: Pixel,
    dst_mask: Pixel,
}

impl Transfer {
    pub fn new(src: PixelFormat, dst: PixelFormat) -> Self {
        Self {
            src,
            dst,
            same: src == dst,
            src_mask: encode(&src, MASK_COLOR),
            dst_mask: encode(&dst, MASK_COLOR),
        }
    }

    /// Transfer between two pixels of the same format (primitives)
    pub fn within(format: PixelFormat) -> Self {
        Self::new(format, format)
    }

    #[inline]
    pub fn src_format(&self) -> &PixelFormat {
        &self.src
    }

    #[inline]
    pub fn dst_format(&self) -> &PixelFormat {
        &self.dst
    }

    /// True when no conversion is needed (fast path)
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.same
    }

    /// The color-key sentinel encoded in the source format
    #[inline]
    pub fn src_mask(&self) -> Pixel {
        self.src_mask
    }

    /// The color-key sentinel encoded in the destination format
    #[inline]
    pub fn dst_mask(&self) -> Pixel {
        self.dst_mask
    }

    /// Convert a source pixel into the destination format
    #[inline]
    pub fn convert(&self, pixel: Pixel) -> Pixel {
        if self.same {
            pixel
        } else {
            convert(&self.src, &self.dst, pixel)
        }
    }
}

/// A total per-pixel combine function.
///
/// `dst` is in the destination format, `src` in the source format; the
/// result must be in the destination format.
pub trait Combine: Copy {
    /// Whether equal-format rows may be copied byte for byte
    const COPIES: bool = false;

    fn combine(&self, transfer: &Transfer, dst: Pixel, src: Pixel) -> Pixel;
}

/// Overwrite the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Replace;

impl Combine for Replace {
    const COPIES: bool = true;

    #[inline]
    fn combine(&self, transfer: &Transfer, _dst: Pixel, src: Pixel) -> Pixel {
        transfer.convert(src)
    }
}

/// Overwrite the destination unless the source pixel is the mask color.
///
/// A pixel that only becomes the mask after conversion (a near-magenta
/// color in a narrower destination) is skipped too, so the sentinel never
/// reaches the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorKey;

impl Combine for ColorKey {
    #[inline]
    fn combine(&self, transfer: &Transfer, dst: Pixel, src: Pixel) -> Pixel {
        if src == transfer.src_mask() {
            return dst;
        }
        let out = transfer.convert(src);
        if out == transfer.dst_mask() {
            dst
        } else {
            out
        }
    }
}

/// Saturating per-channel addition of the RGB components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Additive;

impl Combine for Additive {
    #[inline]
    fn combine(&self, transfer: &Transfer, dst: Pixel, src: Pixel) -> Pixel {
        blend_add(transfer.dst_format(), dst, transfer.convert(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::convert::decode;
    use crate::pixel::rgb;

    #[test]
    fn test_replace_converts() {
        let t = Transfer::new(PixelFormat::RGB565, PixelFormat::RGB24);
        assert!(!t.is_identity());
        assert_eq!(Replace.combine(&t, 0x123456, 0xF800), 0xF80000);
    }

    #[test]
    fn test_color_key_compares_in_source_format() {
        let t = Transfer::new(PixelFormat::RGB565, PixelFormat::ARGB32);
        assert_eq!(t.src_mask(), 0xF81F);
        assert_eq!(ColorKey.combine(&t, 0xdeadbeef, 0xF81F), 0xdeadbeef);
        assert_eq!(ColorKey.combine(&t, 0xdeadbeef, 0xF800), 0x00F80000);
    }

    #[test]
    fn test_color_key_skips_colors_that_narrow_onto_the_mask() {
        // Not the mask in ARGB32, but truncates to it in RGB565
        let t = Transfer::new(PixelFormat::ARGB32, PixelFormat::RGB565);
        assert_eq!(t.dst_mask(), 0xF81F);
        let near = encode(&PixelFormat::ARGB32, rgb(0xfe, 0, 0xfe));
        assert_ne!(near, t.src_mask());
        assert_eq!(ColorKey.combine(&t, 0x1234, near), 0x1234);

        // Neighbors that stay distinct after narrowing still draw
        let other = encode(&PixelFormat::ARGB32, rgb(0xf0, 0, 0xf0));
        assert_eq!(ColorKey.combine(&t, 0x1234, other), 0xF01E);
    }

    #[test]
    fn test_additive_blends_in_destination_format() {
        let t = Transfer::new(PixelFormat::RGB24, PixelFormat::ARGB32);
        let dst = encode(&PixelFormat::ARGB32, rgb(250, 0, 10));
        let out = Additive.combine(&t, dst, 0x102030);
        assert_eq!(decode(&PixelFormat::ARGB32, out), rgb(255, 0x20, 0x3a));
    }

    #[test]
    fn test_within_is_identity() {
        let t = Transfer::within(PixelFormat::BGR24);
        assert!(t.is_identity());
        assert_eq!(t.convert(0xabcdef), 0xabcdef);
    }
}
