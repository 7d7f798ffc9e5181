//! rasterfb: a software 2D raster engine for framebuffer displays.
//!
//! Pixels live in [`Bitmap`]s tagged with a [`PixelFormat`]. Bitmaps can be
//! blitted onto each other (clipped, scaled, mirrored, color-keyed or
//! additively blended, converting formats on the fly) and drawn on with a
//! [`Pen`]. Every write goes through a [`Combine`] operation, so each blit and
//! primitive exists in opaque, color-keyed and additive form.
//!
//! ```no_run
//! use rasterfb::{rgb, Bitmap, PixelFormat, MASK_COLOR};
//!
//! let mut screen = Bitmap::new(PixelFormat::ARGB32, 320, 240)?;
//! let mut sprite = Bitmap::new(PixelFormat::RGB565, 16, 16)?;
//! sprite.clear(MASK_COLOR);
//! sprite.pen().fill_circle(rgb(255, 0, 0), 8, 8, 7);
//! screen.blit_masked(&sprite, 100, 50);
//! # Ok::<(), rasterfb::BitmapError>(())
//! ```

pub mod bitmap;
pub mod combine;
pub mod config;
pub mod display;
pub mod error;
pub mod pixel;
pub mod primitive;

pub use bitmap::{Bitmap, Orientation, Rect};
pub use combine::{Additive, ColorKey, Combine, Replace, Transfer};
pub use config::{DisplayConfig, EngineConfig, FormatSpec};
pub use error::{BitmapError, ConfigError, DisplayError, FormatError};
pub use pixel::convert::{blend_add, convert, decode, encode};
pub use pixel::{
    rgb, rgba, Channel, ChannelSpan, FormatId, FormatTable, Pixel, PixelFormat, MASK_COLOR,
};
pub use primitive::{Dash, DashDirection, Pen};
