use std::sync::Arc;
use video_negotiation::modes::VideoMode;
use video_negotiation::pixel::{ChannelMasks, PixelFormat};
use video_negotiation::render::backends::null::{NullConverter, NullDriver};
use video_negotiation::render::{ModeCatalogue, Rect};
use video_negotiation::surface::{Surface, SurfaceFlags};
use video_negotiation::{VideoConfig, VideoDevice, VideoError};

fn main() -> Result<(), VideoError> {
    env_logger::init();

    // A fake fullscreen display: a handful of sizes at 16 and 32 bits, nothing at 24.
    let driver = NullDriver::new(32)
        .with_modes(
            32,
            ModeCatalogue::Sizes(vec![Rect::size(1280, 1024), Rect::size(1024, 768), Rect::size(800, 600)]),
        )
        .with_modes(16, ModeCatalogue::Sizes(vec![Rect::size(640, 480), Rect::size(320, 240)]))
        .with_hardware_blit(true);
    let updates = driver.update_log();

    // Optional configuration file, otherwise defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => VideoConfig::load(path)?,
        None => VideoConfig::default(),
    };
    let mut device = VideoDevice::new(Some(config), Box::new(driver), Box::new(NullConverter::new()));
    println!("{} with {:?}", device.driver_name(), device.config());

    for bpp in [8, 16, 24, 32] {
        match device.list_modes(Some(&PixelFormat::depth_only(bpp)), SurfaceFlags::FULLSCREEN) {
            modes if modes.is_empty() => println!("{bpp} bpp: no modes"),
            modes => println!("{bpp} bpp: {modes:?}"),
        }
    }

    // Ask around before switching
    for (w, h, bpp) in [(640, 480, 24), (800, 600, 24), (700, 500, 32), (2000, 2000, 32)] {
        let ok = device.video_mode_ok(w, h, bpp, SurfaceFlags::FULLSCREEN);
        let mut mode = VideoMode::new(w, h, bpp);
        match device.get_video_mode(&mut mode, SurfaceFlags::FULLSCREEN) {
            Ok(()) => println!("{w}x{h}x{bpp}: ok at {ok} bpp, closest {}x{}x{}", mode.width, mode.height, mode.bpp),
            Err(e) => println!("{w}x{h}x{bpp}: ok at {ok} bpp, {e}"),
        }
    }

    let screen = device.set_video_mode(700, 500, 32, SurfaceFlags::FULLSCREEN | SurfaceFlags::HWSURFACE)?;
    if let Some(surface) = device.video_surface() {
        println!("visible surface: {surface:?}");
    }

    // Prepare a sprite for fast blitting
    let sprite = Surface::new(
        32,
        32,
        Arc::new(PixelFormat::new(16, ChannelMasks::default())),
        SurfaceFlags::SRCALPHA,
    );
    let converted = device.display_format_alpha(&sprite)?;
    if let Some(surface) = device.video_surface_mut() {
        let white = surface.format().map_rgb(255, 255, 255);
        surface.put_pixel(10, 10, white);
    }
    println!("sprite converted to {:?} ({})", converted.format().masks, converted.flags());

    device.update_rect(screen, 10, 10, 100, 100);
    device.update_rect(screen, 790, 0, 20, 20);
    device.flip(screen);

    let log = updates.lock().map(|l| l.clone()).unwrap_or_default();
    for batch in log {
        println!("update: {batch:?}");
    }

    device.video_quit();
    Ok(())
}
