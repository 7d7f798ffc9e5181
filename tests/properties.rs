//! Behavioral properties of conversion, blitting and rasterization,
//! checked through the public API only.

use rasterfb::{
    convert, encode, rgb, rgba, Bitmap, ChannelSpan, FormatId, FormatTable, Pixel, PixelFormat,
    MASK_COLOR,
};

fn formats() -> Vec<PixelFormat> {
    let mut all: Vec<_> = FormatId::ALL.iter().filter_map(|id| id.builtin()).collect();
    all.push(
        PixelFormat::new(
            8,
            ChannelSpan::new(5, 3),
            ChannelSpan::new(2, 3),
            ChannelSpan::new(0, 2),
            ChannelSpan::ABSENT,
        )
        .unwrap(),
    );
    all
}

/// A spread of canonical colors including the extremes and the mask
fn colors() -> Vec<Pixel> {
    let mut out = vec![0, 0xffff_ffff, MASK_COLOR];
    let mut seed: u32 = 0x1234_5678;
    for _ in 0..200 {
        // xorshift
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        out.push(seed);
    }
    out
}

fn numbered(format: PixelFormat, w: u32, h: u32) -> Bitmap<'static> {
    let mut bmp = Bitmap::new(format, w, h).unwrap();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            bmp.put_pixel(x, y, rgb(x as u8 * 17, y as u8 * 29, 0x40));
        }
    }
    bmp
}

#[test_log::test]
fn self_conversion_is_identity() {
    for f in formats() {
        for c in colors() {
            let p = encode(&f, c);
            assert_eq!(convert(&f, &f, p), p);
        }
    }
}

#[test_log::test]
fn widening_round_trip_is_lossless() {
    let all = formats();
    for a in &all {
        for b in &all {
            let narrower = rasterfb::Channel::ALL
                .iter()
                .all(|&ch| a.span(ch).width <= b.span(ch).width);
            if !narrower {
                continue;
            }
            for c in colors() {
                let p = encode(a, c);
                assert_eq!(convert(b, a, convert(a, b, p)), p, "{:?} -> {:?}", a, b);
            }
        }
    }
}

#[test]
fn blit_at_origin_copies_into_top_left() {
    let src = numbered(PixelFormat::RGB24, 3, 2);
    let mut dst = Bitmap::new(PixelFormat::RGB24, 5, 4).unwrap();
    dst.clear(rgb(1, 2, 3));
    dst.blit(&src, 0, 0);

    for y in 0..4 {
        for x in 0..5 {
            let expected = if x < 3 && y < 2 {
                src.pixel(x, y)
            } else {
                Some(encode(&PixelFormat::RGB24, rgb(1, 2, 3)))
            };
            assert_eq!(dst.pixel(x, y), expected, "({}, {})", x, y);
        }
    }
}

#[test]
fn negative_offset_drops_leading_columns() {
    let src = numbered(PixelFormat::ARGB32, 6, 2);
    let mut dst = Bitmap::new(PixelFormat::ARGB32, 6, 2).unwrap();
    dst.blit(&src, -3, 0);
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(dst.pixel(x, y), src.pixel(x + 3, y));
        }
        for x in 3..6 {
            assert_eq!(dst.pixel(x, y), Some(0));
        }
    }
}

#[test]
fn masked_blit_never_writes_the_sentinel() {
    let all = [
        PixelFormat::RGB565,
        PixelFormat::RGB24,
        PixelFormat::BGR24,
        PixelFormat::ARGB32,
    ];
    for from in all {
        for to in all {
            let mut src = numbered(from, 8, 8);
            for i in 0..8 {
                src.put_pixel(i, i, MASK_COLOR);
                src.put_pixel(7 - i, i, MASK_COLOR);
            }
            // Near-magenta colors that may narrow onto the sentinel
            src.put_pixel(3, 0, rgb(0xfe, 0, 0xfe));
            src.put_pixel(4, 7, rgb(0xf9, 0x03, 0xfc));
            let mut dst = Bitmap::new(to, 8, 8).unwrap();
            dst.blit_masked(&src, 0, 0);

            let sentinel = encode(&to, MASK_COLOR);
            for y in 0..8 {
                for x in 0..8 {
                    assert_ne!(dst.pixel(x, y), Some(sentinel), "{:?} -> {:?} at ({}, {})", from, to, x, y);
                }
            }
            assert_eq!(dst.pixel(0, 0), Some(0));
            let expected = src.pixel(1, 0).map(|p| convert(&from, &to, p));
            assert_eq!(dst.pixel(1, 0), expected);
        }
    }
}

#[test]
fn one_to_one_scaled_blit_equals_blit() {
    let src = numbered(PixelFormat::RGB565, 7, 5);
    for (x, y) in [(0, 0), (2, 3), (-4, -1), (6, -2), (9, 9)] {
        let mut plain = Bitmap::new(PixelFormat::ARGB32, 10, 8).unwrap();
        let mut scaled = Bitmap::new(PixelFormat::ARGB32, 10, 8).unwrap();
        plain.blit(&src, x, y);
        scaled.scaled_blit(&src, x, y, 7, 5);
        assert_eq!(plain.as_bytes(), scaled.as_bytes());
    }
}

#[test]
fn rgb565_red_square_onto_zeroed_bitmap() {
    let table = FormatTable::default();
    let format = table.get(FormatId::Rgb565);
    let mut src = Bitmap::new(format, 2, 2).unwrap();
    src.clear(rgb(255, 0, 0));
    let mut dst = Bitmap::new(format, 4, 4).unwrap();
    dst.blit(&src, 0, 0);

    for y in 0..4 {
        for x in 0..4 {
            let expected = if x < 2 && y < 2 { 0xF800 } else { 0x0000 };
            assert_eq!(dst.pixel(x, y), Some(expected));
        }
    }
}

#[test_log::test]
fn fill_circle_colors_exactly_the_disc() {
    for (cx, cy, r) in [(10, 10, 7), (0, 19, 9), (-3, 5, 6), (15, 15, 1), (10, 10, 0)] {
        let mut bmp = Bitmap::new(PixelFormat::RGB24, 20, 20).unwrap();
        bmp.pen().fill_circle(rgba(9, 9, 9, 0), cx, cy, r);
        for y in 0..20 {
            for x in 0..20 {
                let inside = (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r;
                let lit = bmp.pixel(x, y) != Some(0);
                assert_eq!(inside, lit, "circle ({}, {}) r={} at ({}, {})", cx, cy, r, x, y);
            }
        }
    }
}

#[test]
fn out_of_bounds_single_pixel_ops_are_ignored() {
    let mut bmp = Bitmap::new(PixelFormat::RGB565, 2, 2).unwrap();
    for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (i32::MIN, i32::MAX)] {
        bmp.put_pixel(x, y, rgb(255, 255, 255));
        assert_eq!(bmp.get_pixel(x, y), None);
    }
    assert!(bmp.as_bytes().iter().all(|&b| b == 0));
}
