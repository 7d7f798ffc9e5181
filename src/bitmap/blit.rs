//! Blit engine
//!
//! Every blit variant reduces to the same loop: clip both axes, then for each
//! destination pixel fetch the matching source pixel and hand the pair to a
//! [`Combine`] operation. Variants only differ in how an axis maps destination
//! positions to source positions (straight, mirrored, or scaled) and in the
//! combine operation they pass.
//!
//! Clipping: with an offset of `x < 0` the first `|x|` source columns are
//! skipped and writing starts at destination column 0. The processed count is
//! `min(source remaining, destination remaining)`. Rows work the same way.
//!
//! ```text
//!   x  dx
//!   |  |
//!   v  v
//!   sssssssddddddd
//!   sssssssddddddd
//!      ^
//!      sx (= -x)
//! ```

use super::{load, store, Bitmap};
use crate::combine::{Additive, ColorKey, Combine, Replace, Transfer};

/// Direction in which source rows are read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Normal,
    /// Mirror horizontally: source rows are read right to left
    HFlip,
}

/// Axis-aligned rectangle in bitmap coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

// ============================================================================
// Axis mapping
// ============================================================================

/// Source indices feeding consecutive destination positions
#[derive(Debug, Clone, PartialEq, Eq)]
enum Samples {
    /// `start, start + 1, ...`
    Forward { start: usize, len: usize },
    /// `last, last - 1, ...`
    Reverse { last: usize, len: usize },
    /// Nearest-neighbor picks of a scaled blit
    Picks(Vec<usize>),
}

/// One clipped axis of a blit
#[derive(Debug, Clone, PartialEq, Eq)]
struct Axis {
    dst_start: usize,
    samples: Samples,
}

impl Axis {
    /// Unscaled axis: `src_len` source elements written at `offset`
    fn clipped(offset: i32, src_len: u32, dst_len: u32, orientation: Orientation) -> Option<Self> {
        let offset = i64::from(offset);
        let dst_start = offset.max(0);
        let skip = (-offset).max(0);
        let len = (i64::from(src_len) - skip).min(i64::from(dst_len) - dst_start);
        if len <= 0 {
            return None;
        }

        let len = len as usize;
        let samples = match orientation {
            Orientation::Normal => Samples::Forward {
                start: skip as usize,
                len,
            },
            Orientation::HFlip => Samples::Reverse {
                last: (i64::from(src_len) - 1 - skip) as usize,
                len,
            },
        };
        Some(Self {
            dst_start: dst_start as usize,
            samples,
        })
    }

    /// Scaled axis: the source span `from_offset..from_offset + from_len` is
    /// stretched over the destination span `to_offset..to_offset + to_len`.
    ///
    /// Destination step `i` samples source `from_offset + floor(i * from_len / to_len)`.
    /// Steps falling outside either bitmap (or outside the source span) are dropped.
    fn scaled(
        to_offset: i32,
        to_len: u32,
        dst_limit: u32,
        from_offset: i32,
        from_len: u32,
        src_limit: u32,
    ) -> Option<Self> {
        if to_len == 0 || from_len == 0 {
            return None;
        }

        let to_offset = i64::from(to_offset);
        let from_offset = i64::from(from_offset);
        let src_end = (from_offset + i64::from(from_len)).min(i64::from(src_limit));

        let mut dst_start = None;
        let mut picks = Vec::new();
        for i in (-to_offset).max(0)..i64::from(to_len) {
            let d = to_offset + i;
            if d >= i64::from(dst_limit) {
                break;
            }
            // i < to_len, so the quotient stays below from_len
            let step = i128::from(i) * i128::from(from_len) / i128::from(to_len);
            let s = from_offset + step as i64;
            if s < 0 {
                continue;
            }
            if s >= src_end {
                break;
            }
            dst_start.get_or_insert(d as usize);
            picks.push(s as usize);
        }

        dst_start.map(|dst_start| Self {
            dst_start,
            samples: Samples::Picks(picks),
        })
    }

    #[inline]
    fn len(&self) -> usize {
        match &self.samples {
            Samples::Forward { len, .. } | Samples::Reverse { len, .. } => *len,
            Samples::Picks(picks) => picks.len(),
        }
    }

    /// Source index for destination step `i`
    #[inline]
    fn source(&self, i: usize) -> usize {
        match &self.samples {
            Samples::Forward { start, .. } => start + i,
            Samples::Reverse { last, .. } => last - i,
            Samples::Picks(picks) => picks[i],
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Run `op` over every (destination, source) pixel pair selected by the axes
fn composite<C: Combine>(dst: &mut Bitmap<'_>, src: &Bitmap<'_>, cols: &Axis, rows: &Axis, op: C) {
    if dst.is_wiped() || src.is_wiped() {
        return;
    }

    let transfer = Transfer::new(src.format(), dst.format());
    let sbpp = src.format().bytes_per_pixel();
    let dbpp = dst.format().bytes_per_pixel();
    let copy_rows = C::COPIES && transfer.is_identity();
    log::trace!(
        "blit {}x{} span, {} path",
        cols.len(),
        rows.len(),
        if transfer.is_identity() { "fast" } else { "slow" }
    );

    let first = cols.dst_start * dbpp;
    let last = (cols.dst_start + cols.len()) * dbpp;
    for r in 0..rows.len() {
        let src_row = src.row(rows.source(r));
        let dst_row = &mut dst.row_mut(rows.dst_start + r)[first..last];

        match cols.samples {
            Samples::Forward { start, len } if copy_rows => {
                dst_row.copy_from_slice(&src_row[start * sbpp..(start + len) * sbpp]);
            },
            _ => {
                for (i, out) in dst_row.chunks_exact_mut(dbpp).enumerate() {
                    let s = cols.source(i) * sbpp;
                    let pixel = op.combine(&transfer, load(out, dbpp), load(&src_row[s..], sbpp));
                    store(out, dbpp, pixel);
                }
            },
        }
    }
}

impl Bitmap<'_> {
    /// Copy `src` onto this bitmap with its top-left corner at (x, y)
    pub fn blit(&mut self, src: &Bitmap<'_>, x: i32, y: i32) {
        self.blit_with(src, x, y, Replace, Orientation::Normal);
    }

    /// Copy `src` mirrored horizontally
    pub fn blit_hflip(&mut self, src: &Bitmap<'_>, x: i32, y: i32) {
        self.blit_with(src, x, y, Replace, Orientation::HFlip);
    }

    /// Copy `src`, leaving destination pixels alone where `src` holds the mask color
    pub fn blit_masked(&mut self, src: &Bitmap<'_>, x: i32, y: i32) {
        self.blit_with(src, x, y, ColorKey, Orientation::Normal);
    }

    /// Add `src` onto this bitmap, saturating each RGB channel
    pub fn blit_blend_add(&mut self, src: &Bitmap<'_>, x: i32, y: i32) {
        self.blit_with(src, x, y, Additive, Orientation::Normal);
    }

    /// Unscaled blit with any combine operation and read direction
    pub fn blit_with<C: Combine>(
        &mut self,
        src: &Bitmap<'_>,
        x: i32,
        y: i32,
        op: C,
        orientation: Orientation,
    ) {
        let Some(cols) = Axis::clipped(x, src.width(), self.width(), orientation) else {
            return;
        };
        let Some(rows) = Axis::clipped(y, src.height(), self.height(), Orientation::Normal) else {
            return;
        };
        composite(self, src, &cols, &rows, op);
    }

    /// Blit the whole of `src` stretched to `w` x `h` (nearest neighbor)
    pub fn scaled_blit(&mut self, src: &Bitmap<'_>, x: i32, y: i32, w: u32, h: u32) {
        self.scaled_blit_with(src, x, y, w, h, Replace);
    }

    pub fn scaled_blit_with<C: Combine>(
        &mut self,
        src: &Bitmap<'_>,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        op: C,
    ) {
        let from = Rect::new(0, 0, src.width(), src.height());
        self.scaled_region_blit_with(src, from, Rect::new(x, y, w, h), op);
    }

    /// Blit the `from` region of `src` stretched over the `to` region of this bitmap
    pub fn scaled_region_blit(&mut self, src: &Bitmap<'_>, from: Rect, to: Rect) {
        self.scaled_region_blit_with(src, from, to, Replace);
    }

    pub fn scaled_region_blit_with<C: Combine>(
        &mut self,
        src: &Bitmap<'_>,
        from: Rect,
        to: Rect,
        op: C,
    ) {
        let Some(cols) = Axis::scaled(to.x, to.w, self.width(), from.x, from.w, src.width()) else {
            return;
        };
        let Some(rows) = Axis::scaled(to.y, to.h, self.height(), from.y, from.h, src.height())
        else {
            return;
        };
        composite(self, src, &cols, &rows, op);
    }
}
