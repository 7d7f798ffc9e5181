//! SDL2 preview window
//!
//! Shows the native surface on a desktop. Bitmaps whose format SDL can
//! stream directly are uploaded as is; anything else goes through a staging
//! bitmap in ARGB32 first.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;
use sdl2::EventPump;

use crate::bitmap::Bitmap;
use crate::config::DisplayConfig;
use crate::pixel::PixelFormat;

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture matching one bitmap format
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    /// Set when the bitmap format has no SDL equivalent
    staging: Option<Bitmap<'static>>,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

/// SDL texture format with the same byte layout as `format`
fn sdl_format(format: &PixelFormat) -> Option<PixelFormatEnum> {
    // Bitmaps pack pixels little-endian, so SDL's packed formats line up
    // and the 24 bit byte orders are mirrored.
    match *format {
        PixelFormat::RGB565 => Some(PixelFormatEnum::RGB565),
        PixelFormat::RGB24 => Some(PixelFormatEnum::BGR24),
        PixelFormat::BGR24 => Some(PixelFormatEnum::RGB24),
        PixelFormat::RGBA32 => Some(PixelFormatEnum::RGBA8888),
        PixelFormat::ARGB32 => Some(PixelFormatEnum::ARGB8888),
        PixelFormat::ABGR32 => Some(PixelFormatEnum::ABGR8888),
        _ => None,
    }
}

impl Window {
    /// Open a vsynced window sized to the configured display
    pub fn open(config: &DisplayConfig) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let (width, height) = (config.width, config.height);
        let title = format!("rasterfb {}x{} @ {} bpp", width, height, config.format.bits_per_pixel);

        let sdl = sdl2::init()?;
        let canvas = sdl
            .video()?
            .window(&title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?
            .into_canvas()
            .present_vsync()
            .build()
            .map_err(|e| e.to_string())?;
        log::info!("opened window {}", title);

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump()?;
        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(&mut self, target: &mut RenderTarget, frame: &Bitmap<'_>) -> Result<(), String> {
        match &mut target.staging {
            Some(staging) => {
                staging.blit(frame, 0, 0);
                target
                    .texture
                    .update(None, staging.as_bytes(), staging.line_size())
                    .map_err(|e| e.to_string())?;
            },
            None => {
                target
                    .texture
                    .update(None, frame.as_bytes(), frame.line_size())
                    .map_err(|e| e.to_string())?;
            },
        }

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Streaming texture for `width` x `height` bitmaps in `format`
    pub fn new(
        texture_creator: &'a TextureCreator<WindowContext>,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let (sdl, staging) = match sdl_format(&format) {
            Some(sdl) => (sdl, None),
            None => {
                log::debug!("no SDL texture for {} bpp format, staging through ARGB32", format.bpp());
                let staging = Bitmap::new(PixelFormat::ARGB32, width, height).map_err(|e| e.to_string())?;
                (PixelFormatEnum::ARGB8888, Some(staging))
            },
        };

        let texture = texture_creator
            .create_texture_streaming(sdl, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture, staging })
    }
}
