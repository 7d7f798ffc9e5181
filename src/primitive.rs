//! Primitive rasterizer
//!
//! Lines, rectangles, circles and dashed outlines. A [`Pen`] borrows a bitmap
//! together with a [`Combine`] operation, so every shape comes in an opaque
//! and an additive (or color-keyed) form from the same code.
//!
//! Colors are canonical RGBA32 and are encoded into the bitmap's format once
//! per call. Everything is clipped per pixel, and no shape writes the same
//! pixel twice (thick dashed rectangles excepted, their strokes overlap at
//! the corners).

use crate::bitmap::{load, store, Bitmap};
use crate::combine::{Combine, Replace, Transfer};
use crate::pixel::convert::encode;
use crate::pixel::Pixel;

#[inline]
fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Integer square root (floor)
fn isqrt(n: i64) -> i64 {
    let mut root = (n as f64).sqrt() as i64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

// ============================================================================
// Dash pattern
// ============================================================================

/// End of a dashed line its pattern is measured from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashDirection {
    /// From the low coordinate (left or top); clockwise for rectangles
    #[default]
    Forward,
    /// From the high coordinate (right or bottom); counter-clockwise for rectangles
    Backward,
}

/// Two-color dash pattern.
///
/// A pixel `d` steps from the pattern origin has phase `start + d` and takes
/// the first color when `phase mod (2 * length) < length`. Distances are
/// measured on the unclipped line, so clipping never shifts the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dash {
    pub start: i32,
    /// Pixels per dash; zero or negative draws the first color only
    pub length: i32,
    pub direction: DashDirection,
    /// Line thickness in pixels, centered on the line (the odd pixel of an
    /// even stroke goes below or right). Zero counts as one.
    pub stroke: u32,
}

impl Dash {
    pub const fn new(length: i32) -> Self {
        Self {
            start: 0,
            length,
            direction: DashDirection::Forward,
            stroke: 1,
        }
    }

    pub const fn with_start(mut self, start: i32) -> Self {
        self.start = start;
        self
    }

    pub const fn with_direction(mut self, direction: DashDirection) -> Self {
        self.direction = direction;
        self
    }

    pub const fn with_stroke(mut self, stroke: u32) -> Self {
        self.stroke = stroke;
        self
    }

    /// True if a pixel at `distance` from the origin gets the first color
    #[inline]
    fn is_first(&self, distance: i64) -> bool {
        if self.length <= 0 {
            return true;
        }
        let period = 2 * i64::from(self.length);
        (i64::from(self.start) + distance).rem_euclid(period) < i64::from(self.length)
    }

    /// Perpendicular offsets covered by the stroke
    fn offsets(&self) -> std::ops::RangeInclusive<i64> {
        let stroke = i64::from(self.stroke.max(1));
        let first = -(stroke - 1) / 2;
        first..=first + stroke - 1
    }
}

impl Default for Dash {
    fn default() -> Self {
        Self::new(4)
    }
}

// ============================================================================
// Pen
// ============================================================================

/// Drawing handle over a bitmap
pub struct Pen<'p, 'a, C: Combine = Replace> {
    target: &'p mut Bitmap<'a>,
    op: C,
    transfer: Transfer,
}

impl<'a> Bitmap<'a> {
    /// Pen that overwrites pixels
    pub fn pen(&mut self) -> Pen<'_, 'a, Replace> {
        self.pen_with(Replace)
    }

    /// Pen that merges pixels with `op`
    pub fn pen_with<C: Combine>(&mut self, op: C) -> Pen<'_, 'a, C> {
        let transfer = Transfer::within(self.format());
        Pen {
            target: self,
            op,
            transfer,
        }
    }
}

impl<C: Combine> Pen<'_, '_, C> {
    #[inline]
    fn encode(&self, color: Pixel) -> Pixel {
        encode(self.transfer.dst_format(), color)
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, pixel: Pixel) {
        if let Some(dst) = self.target.pixel(x, y) {
            let out = self.op.combine(&self.transfer, dst, pixel);
            self.target.set_pixel(x, y, out);
        }
    }

    /// `plot` for coordinates that may not fit an i32
    #[inline]
    fn plot_wide(&mut self, x: i64, y: i64, pixel: Pixel) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.plot(x, y, pixel);
        }
    }

    /// Horizontal run of encoded pixels, straight on the row bytes
    fn span(&mut self, x1: i32, x2: i32, y: i32, pixel: Pixel) {
        if y < 0 || y >= self.target.height() as i32 {
            return;
        }
        let (x1, x2) = ordered(x1, x2);
        let start = x1.max(0);
        let end = x2.min(self.target.width() as i32 - 1);
        if start > end {
            return;
        }

        let bpp = self.transfer.dst_format().bytes_per_pixel();
        let row = self.target.row_mut(y as usize);
        let Some(run) = row.get_mut(start as usize * bpp..(end as usize + 1) * bpp) else {
            return;
        };
        for out in run.chunks_exact_mut(bpp) {
            let merged = self.op.combine(&self.transfer, load(out, bpp), pixel);
            store(out, bpp, merged);
        }
    }

    fn column(&mut self, x: i32, y1: i32, y2: i32, pixel: Pixel) {
        if x < 0 || x >= self.target.width() as i32 {
            return;
        }
        let (y1, y2) = ordered(y1, y2);
        for y in y1.max(0)..=y2.min(self.target.height() as i32 - 1) {
            self.plot(x, y, pixel);
        }
    }

    // ========================================================================
    // Lines and rectangles
    // ========================================================================

    /// Horizontal line from x1 to x2 inclusive
    pub fn draw_hline(&mut self, color: Pixel, x1: i32, x2: i32, y: i32) {
        let pixel = self.encode(color);
        self.span(x1, x2, y, pixel);
    }

    /// Vertical line from y1 to y2 inclusive
    pub fn draw_vline(&mut self, color: Pixel, x: i32, y1: i32, y2: i32) {
        let pixel = self.encode(color);
        self.column(x, y1, y2, pixel);
    }

    /// Bresenham line, both endpoints included.
    ///
    /// Step `k` along the major axis sits `round(k * minor / major)` (halves
    /// rounding up) along the minor one, which is exactly where the error
    /// term walk lands. Only the steps whose major coordinate falls inside
    /// the bitmap are visited.
    pub fn draw_line(&mut self, color: Pixel, x1: i32, y1: i32, x2: i32, y2: i32) {
        let pixel = self.encode(color);
        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let (dx, dy) = ((x2 - x1).abs(), (y2 - y1).abs());
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };

        let x_major = dx >= dy;
        let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
        let (start, step, limit) = if x_major {
            (x1, sx, i64::from(self.target.width()))
        } else {
            (y1, sy, i64::from(self.target.height()))
        };
        let (first, last) = if step > 0 {
            (-start, limit - 1 - start)
        } else {
            (start - (limit - 1), start)
        };

        for k in first.max(0)..=last.min(major) {
            let offset = if major == 0 {
                0
            } else {
                let twice = 2 * i128::from(major);
                ((2 * i128::from(k) * i128::from(minor) + i128::from(major)) / twice) as i64
            };
            let (x, y) = if x_major {
                (x1 + sx * k, y1 + sy * offset)
            } else {
                (x1 + sx * offset, y1 + sy * k)
            };
            self.plot_wide(x, y, pixel);
        }
    }

    /// Rectangle outline through both corners
    pub fn draw_rect(&mut self, color: Pixel, x1: i32, y1: i32, x2: i32, y2: i32) {
        let pixel = self.encode(color);
        let (x_min, x_max) = ordered(x1, x2);
        let (y_min, y_max) = ordered(y1, y2);

        self.span(x_min, x_max, y_min, pixel);
        if y_max != y_min {
            self.span(x_min, x_max, y_max, pixel);
        }
        if y_max - y_min > 1 {
            self.column(x_min, y_min + 1, y_max - 1, pixel);
            if x_max != x_min {
                self.column(x_max, y_min + 1, y_max - 1, pixel);
            }
        }
    }

    /// Filled rectangle, both corners included
    pub fn fill_rect(&mut self, color: Pixel, x1: i32, y1: i32, x2: i32, y2: i32) {
        let pixel = self.encode(color);
        let (y_min, y_max) = ordered(y1, y2);
        for y in y_min.max(0)..=y_max.min(self.target.height() as i32 - 1) {
            self.span(x1, x2, y, pixel);
        }
    }

    // ========================================================================
    // Circles
    // ========================================================================

    /// Circle outline (Bresenham, 8-way symmetric)
    pub fn draw_circle(&mut self, color: Pixel, cx: i32, cy: i32, r: i32) {
        if r < 0 {
            return;
        }
        let pixel = self.encode(color);
        let (cx, cy) = (i64::from(cx), i64::from(cy));

        // Octant points with x past both reaches land outside the bitmap
        let reach_x = cx.abs().max((i64::from(self.target.width()) - 1 - cx).abs());
        let reach_y = cy.abs().max((i64::from(self.target.height()) - 1 - cy).abs());
        let reach = reach_x.max(reach_y);

        let (mut x, mut y) = (0i64, i64::from(r));
        let mut d = 3 - 2 * y;
        while y >= x && x <= reach {
            self.plot_octants(cx, cy, x, y, pixel);
            x += 1;
            if d > 0 {
                y -= 1;
                d += 4 * (x - y) + 10;
            } else {
                d += 4 * x + 6;
            }
        }
    }

    /// The distinct mirror images of octant point `(x, y)`, `0 <= x <= y`
    fn plot_octants(&mut self, cx: i64, cy: i64, x: i64, y: i64, pixel: Pixel) {
        fn mirrored(v: i64) -> impl Iterator<Item = i64> {
            [v, -v].into_iter().take(if v == 0 { 1 } else { 2 })
        }

        let swaps = if x == y { 1 } else { 2 };
        for (a, b) in [(x, y), (y, x)].into_iter().take(swaps) {
            for dx in mirrored(a) {
                for dy in mirrored(b) {
                    self.plot_wide(cx + dx, cy + dy, pixel);
                }
            }
        }
    }

    /// Filled disc: every pixel with `(x-cx)² + (y-cy)² <= r²`
    pub fn fill_circle(&mut self, color: Pixel, cx: i32, cy: i32, r: i32) {
        if r < 0 {
            return;
        }
        let pixel = self.encode(color);
        let r2 = i64::from(r) * i64::from(r);
        let (cy64, r64) = (i64::from(cy), i64::from(r));
        let top = (cy64 - r64).max(0);
        let bottom = (cy64 + r64).min(i64::from(self.target.height()) - 1);

        for y in top..=bottom {
            let dy = y - cy64;
            let half = isqrt(r2 - dy * dy);
            let x1 = (i64::from(cx) - half).max(-1);
            let x2 = (i64::from(cx) + half).min(i64::from(self.target.width()));
            self.span(x1 as i32, x2 as i32, y as i32, pixel);
        }
    }

    // ========================================================================
    // Dashed outlines
    // ========================================================================

    /// One dashed run along a row (`vertical == false`) or a column.
    /// `phase` maps a position along the run to its pattern distance.
    fn dashed_run(
        &mut self,
        pixels: (Pixel, Pixel),
        vertical: bool,
        across: i32,
        lo: i64,
        hi: i64,
        dash: &Dash,
        phase: impl Fn(i64) -> i64,
    ) {
        let limit = if vertical {
            self.target.height()
        } else {
            self.target.width()
        };
        let first = lo.max(0);
        let last = hi.min(i64::from(limit) - 1);

        for along in first..=last {
            let pixel = if dash.is_first(phase(along)) {
                pixels.0
            } else {
                pixels.1
            };
            for offset in dash.offsets() {
                let side = i64::from(across) + offset;
                if vertical {
                    self.plot_wide(side, along, pixel);
                } else {
                    self.plot_wide(along, side, pixel);
                }
            }
        }
    }

    /// Horizontal line alternating between colors `a` and `b`
    pub fn draw_dashed_hline(&mut self, a: Pixel, b: Pixel, x1: i32, x2: i32, y: i32, dash: Dash) {
        let pixels = (self.encode(a), self.encode(b));
        let (lo, hi) = ordered(x1, x2);
        let origin = match dash.direction {
            DashDirection::Forward => i64::from(lo),
            DashDirection::Backward => i64::from(hi),
        };
        let (lo, hi) = (i64::from(lo), i64::from(hi));
        self.dashed_run(pixels, false, y, lo, hi, &dash, |x| (x - origin).abs());
    }

    /// Vertical line alternating between colors `a` and `b`
    pub fn draw_dashed_vline(&mut self, a: Pixel, b: Pixel, x: i32, y1: i32, y2: i32, dash: Dash) {
        let pixels = (self.encode(a), self.encode(b));
        let (lo, hi) = ordered(y1, y2);
        let origin = match dash.direction {
            DashDirection::Forward => i64::from(lo),
            DashDirection::Backward => i64::from(hi),
        };
        let (lo, hi) = (i64::from(lo), i64::from(hi));
        self.dashed_run(pixels, true, x, lo, hi, &dash, |y| (y - origin).abs());
    }

    /// Dashed rectangle outline.
    ///
    /// The pattern starts at the top-left corner and runs clockwise (or
    /// counter-clockwise for `Backward`) without breaking at the corners.
    /// Each side leaves out the corner the previous side already drew.
    pub fn draw_dashed_rect(
        &mut self,
        a: Pixel,
        b: Pixel,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        dash: Dash,
    ) {
        let pixels = (self.encode(a), self.encode(b));
        let (x_min, x_max) = ordered(x1, x2);
        let (y_min, y_max) = ordered(y1, y2);
        let (left, right) = (i64::from(x_min), i64::from(x_max));
        let (top, bottom) = (i64::from(y_min), i64::from(y_max));
        let (w, h) = (right - left, bottom - top);
        let perimeter = 2 * (w + h);
        let oriented = |distance: i64| match dash.direction {
            DashDirection::Forward => distance,
            DashDirection::Backward => perimeter - distance,
        };

        self.dashed_run(pixels, false, y_min, left, right, &dash, |x| oriented(x - left));
        self.dashed_run(pixels, true, x_max, top + 1, bottom, &dash, |y| {
            oriented(w + (y - top))
        });
        if h > 0 {
            self.dashed_run(pixels, false, y_max, left, right - 1, &dash, |x| {
                oriented(w + h + (right - x))
            });
        }
        if w > 0 {
            self.dashed_run(pixels, true, x_min, top + 1, bottom - 1, &dash, |y| {
                oriented(2 * w + h + (bottom - y))
            });
        }
    }
}
