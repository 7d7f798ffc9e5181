//! Pixel conversion
//!
//! Channel values are rescaled by plain shifts: narrowing truncates the low
//! bits, widening zero-fills them. No rounding and no bit replication, so a
//! value widened and narrowed back is always unchanged.

use super::{channels, rgb, Channel, Pixel, PixelFormat};

/// Rescale a channel value from `from` bits to `to` bits.
#[inline]
pub fn rescale(value: u32, from: u32, to: u32) -> u32 {
    if to < from {
        value.checked_shr(from - to).unwrap_or(0)
    } else {
        value.checked_shl(to - from).unwrap_or(0)
    }
}

/// Encode a canonical RGBA32 color into `format`.
#[inline]
pub fn encode(format: &PixelFormat, color: Pixel) -> Pixel {
    let mut pixel = 0;
    for channel in Channel::ALL {
        let span = format.span(channel);
        let value = (color >> channel.canonical_shift()) & 0xff;
        pixel |= span.place(rescale(value, 8, span.width));
    }
    pixel
}

/// Decode a `format` pixel back into canonical RGBA32.
/// Channels missing from the format come out as zero.
#[inline]
pub fn decode(format: &PixelFormat, pixel: Pixel) -> Pixel {
    let mut color = 0;
    for channel in Channel::ALL {
        let span = format.span(channel);
        let value = rescale(span.extract(pixel), span.width, 8) & 0xff;
        color |= value << channel.canonical_shift();
    }
    color
}

/// Convert a pixel from `src` format to `dst` format.
///
/// Each channel goes straight from its source width to its destination
/// width; it is never routed through the 8 bit canonical form.
#[inline]
pub fn convert(src: &PixelFormat, dst: &PixelFormat, pixel: Pixel) -> Pixel {
    if src == dst {
        return pixel;
    }
    let mut out = 0;
    for channel in Channel::ALL {
        let from = src.span(channel);
        let to = dst.span(channel);
        out |= to.place(rescale(from.extract(pixel), from.width, to.width));
    }
    out
}

/// Additive blend of two `format` pixels.
///
/// RGB channels are added at 8 bit precision and clamped to 255. Alpha is
/// ignored and the result carries a zero alpha component.
#[inline]
pub fn blend_add(format: &PixelFormat, dst: Pixel, src: Pixel) -> Pixel {
    let [dr, dg, db, _] = channels(decode(format, dst));
    let [sr, sg, sb, _] = channels(decode(format, src));
    encode(
        format,
        rgb(dr.saturating_add(sr), dg.saturating_add(sg), db.saturating_add(sb)),
    )
}
