use std::path::PathBuf;
use std::time::Instant;

use rasterfb::display::Framebuffer;
use rasterfb::{
    rgb, Additive, Bitmap, BitmapError, ColorKey, Dash, DashDirection, DisplayConfig, EngineConfig,
    FormatId, FormatTable, Orientation, PixelFormat, Rect, MASK_COLOR,
};

const DEFAULT_FRAMES: u32 = 120;

/// Command line options
struct Options {
    config: Option<PathBuf>,
    frames: u32,
    output: Option<PathBuf>,
    window: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        config: None,
        frames: DEFAULT_FRAMES,
        output: None,
        window: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--window" => options.window = true,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--frames" | "-n" => {
                if i + 1 < args.len() {
                    if let Ok(n) = args[i + 1].parse::<u32>() {
                        options.frames = n;
                    }
                    i += 1;
                }
            },
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    options.output = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: rasterfb-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --config FILE, -c FILE  Display configuration (JSON)");
                println!(
                    "  --frames N, -n N        Number of frames to render (default: {})",
                    DEFAULT_FRAMES
                );
                println!("  --output FILE, -o FILE  Dump the final surface as raw pixels");
                println!("  --window                Show the surface in an SDL2 window");
                println!("  --help                  Show this help message");
                std::process::exit(0);
            },
            other => log::warn!("ignoring unknown argument {}", other),
        }
        i += 1;
    }

    options
}

/// Position bouncing between 0 and `range`
fn bounce(t: i32, range: i32) -> i32 {
    if range <= 0 {
        return 0;
    }
    let p = t.rem_euclid(2 * range);
    if p < range {
        p
    } else {
        2 * range - p
    }
}

/// Sprites in a mix of formats, so every frame runs both blit paths
struct Sprites {
    /// RGB565 ball on a mask-colored background
    ball: Bitmap<'static>,
    /// Asymmetric arrow, blitted as is and mirrored
    arrow: Bitmap<'static>,
    /// RGB24 radial glow for additive blending
    glow: Bitmap<'static>,
    /// Native-format checkerboard for the scalers
    tile: Bitmap<'static>,
}

impl Sprites {
    fn new(table: &FormatTable) -> Result<Self, BitmapError> {
        let mut ball = Bitmap::new(table.get(FormatId::Rgb565), 32, 32)?;
        ball.clear(MASK_COLOR);
        ball.pen().fill_circle(rgb(255, 200, 0), 15, 15, 15);
        ball.pen().draw_circle(rgb(255, 80, 0), 15, 15, 15);
        ball.pen().fill_circle(rgb(255, 255, 255), 10, 9, 3);

        let mut arrow = Bitmap::new(table.get(FormatId::Argb32), 40, 24)?;
        arrow.clear(rgb(20, 20, 60));
        arrow.pen().fill_rect(rgb(0, 200, 255), 2, 9, 26, 14);
        for i in 0..12 {
            arrow.pen().draw_vline(rgb(0, 200, 255), 26 + i, i, 23 - i);
        }

        let mut glow = Bitmap::new(table.get(FormatId::Rgb24), 48, 48)?;
        for r in (1..=23).rev() {
            let level = (24 - r) as u8 * 4;
            glow.pen().fill_circle(rgb(level / 3, level / 2, level), 23, 23, r);
        }

        let mut tile = Bitmap::new(table.native(), 8, 8)?;
        for y in 0..8 {
            for x in 0..8 {
                let color = if (x + y) % 2 == 0 {
                    rgb(200, 200, 200)
                } else {
                    rgb(60, 60, 60)
                };
                tile.put_pixel(x, y, color);
            }
        }

        Ok(Self {
            ball,
            arrow,
            glow,
            tile,
        })
    }
}

/// Draw one frame of the demo scene
fn render(back: &mut Bitmap<'_>, sprites: &Sprites, frame: u32) {
    let (w, h) = (back.width() as i32, back.height() as i32);
    let t = frame as i32;

    back.clear(rgb(8, 8, 24));

    // Scaled checkerboard backdrop, then a zoomed corner of it
    back.scaled_blit(&sprites.tile, 0, 0, w as u32 / 4, h as u32 / 4);
    let zoom = 16 + bounce(t, 48) as u32;
    back.scaled_region_blit(
        &sprites.tile,
        Rect::new(0, 0, 4, 4),
        Rect::new(w - zoom as i32 - 8, 8, zoom, zoom),
    );

    // Grid of lines and a dashed frame crawling clockwise
    let mut pen = back.pen();
    for x in (0..w).step_by(32) {
        pen.draw_line(rgb(30, 30, 70), x, 0, w - 1 - x, h - 1);
    }
    pen.draw_rect(rgb(90, 90, 140), 0, 0, w - 1, h - 1);
    let dash = Dash::new(6).with_start(-t).with_stroke(3);
    pen.draw_dashed_rect(rgb(255, 255, 0), rgb(40, 40, 0), 12, 12, w - 13, h - 13, dash);
    let dash = Dash::new(4).with_start(t).with_direction(DashDirection::Backward);
    pen.draw_dashed_hline(rgb(0, 255, 128), MASK_COLOR, 20, w - 21, h / 2, dash);
    pen.draw_dashed_vline(rgb(0, 255, 128), MASK_COLOR, w / 2, 20, h - 21, dash);

    // Additive circles overlap into brighter spots
    let mut glow_pen = back.pen_with(Additive);
    glow_pen.fill_circle(rgb(120, 0, 0), w / 3, h / 2, 40);
    glow_pen.fill_circle(rgb(0, 120, 0), w / 3 + 30, h / 2, 40);
    glow_pen.draw_circle(rgb(0, 0, 255), w / 3 + 15, h / 2 - 25, 40);

    // Sprites; the ball wanders off the edges to exercise clipping
    let bx = bounce(t * 5, w + 32) - 32;
    let by = bounce(t * 3, h + 32) - 32;
    back.blit_masked(&sprites.ball, bx, by);
    back.blit_blend_add(&sprites.glow, bx - 8, by - 8);

    let ax = bounce(t * 2, w - sprites.arrow.width() as i32);
    if (t / 60) % 2 == 0 {
        back.blit(&sprites.arrow, ax, h - 40);
    } else {
        back.blit_hflip(&sprites.arrow, ax, h - 40);
    }
    back.blit_with(&sprites.ball, w - 48, h - 48, ColorKey, Orientation::HFlip);
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let options = parse_args();

    let config = match &options.config {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let table = config.format_table().map_err(|e| e.to_string())?;
    let native: PixelFormat = table.native();

    let mut framebuffer = Framebuffer::from_config(&config.display).map_err(|e| e.to_string())?;
    let mut back = Bitmap::new(native, framebuffer.width(), framebuffer.height())
        .map_err(|e| e.to_string())?;
    let sprites = Sprites::new(&table).map_err(|e| e.to_string())?;

    log::info!(
        "rendering {} frames at {}x{} ({} bpp)",
        options.frames,
        framebuffer.width(),
        framebuffer.height(),
        native.bpp()
    );

    if options.window {
        run_windowed(&options, &config.display, &mut framebuffer, &mut back, &sprites)?;
    } else {
        let start = Instant::now();
        for frame in 0..options.frames {
            render(&mut back, &sprites, frame);
            framebuffer.present(&back).map_err(|e| e.to_string())?;
        }
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            log::info!(
                "{} frames in {:.3}s ({:.1} fps)",
                options.frames,
                elapsed,
                f64::from(options.frames) / elapsed
            );
        }
    }

    if let Some(path) = &options.output {
        framebuffer.dump(path).map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(feature = "window")]
fn run_windowed(
    options: &Options,
    display: &DisplayConfig,
    framebuffer: &mut Framebuffer,
    back: &mut Bitmap<'_>,
    sprites: &Sprites,
) -> Result<(), String> {
    use rasterfb::display::{InputEvent, RenderTarget, Window};

    let (mut window, texture_creator) = Window::open(display)?;
    let mut target = RenderTarget::new(
        &texture_creator,
        framebuffer.format(),
        framebuffer.width(),
        framebuffer.height(),
    )?;

    // Zero frames means run until the window is closed
    let mut frame = 0;
    'main: while options.frames == 0 || frame < options.frames {
        for event in window.poll_events() {
            if let InputEvent::Quit = event {
                break 'main;
            }
        }

        render(back, sprites, frame);
        framebuffer.present(back).map_err(|e| e.to_string())?;
        let view = framebuffer.view().map_err(|e| e.to_string())?;
        window.present(&mut target, &view)?;
        frame += 1;
    }

    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_windowed(
    _options: &Options,
    _display: &DisplayConfig,
    _framebuffer: &mut Framebuffer,
    _back: &mut Bitmap<'_>,
    _sprites: &Sprites,
) -> Result<(), String> {
    Err("--window needs a build with the `window` feature".to_string())
}
