//! The video device: one driver, one conversion primitive and at most one visible
//! surface.
//!
//! [`VideoDevice`] is where requests from the application meet the driver. It
//! negotiates modes (see [`crate::modes`]), owns the visible surface installed by
//! [`VideoDevice::set_video_mode`], picks target formats for display conversions and
//! forwards damage rectangles to the driver.
//!
//! ```
//! use video_negotiation::render::backends::null::{NullConverter, NullDriver};
//! use video_negotiation::render::{ModeCatalogue, Rect};
//! use video_negotiation::surface::SurfaceFlags;
//! use video_negotiation::VideoDevice;
//!
//! let driver = NullDriver::new(32).with_modes(32, ModeCatalogue::Sizes(vec![Rect::size(800, 600)]));
//! let mut device = VideoDevice::new(None, Box::new(driver), Box::new(NullConverter::new()));
//!
//! let screen = device.set_video_mode(640, 480, 32, SurfaceFlags::FULLSCREEN).unwrap();
//! assert_eq!(device.video_surface().unwrap().width(), 800);
//! device.update_rect(screen, 0, 0, 0, 0);
//! ```

use crate::config::VideoConfig;
use crate::errors::{set_error, VideoError};
use crate::icon::icon_mask;
use crate::modes::{self, VideoMode};
use crate::pixel::{alpha_format_masks, PixelFormat};
use crate::render::{DisplayDriver, ModeCatalogue, Rect, SurfaceConverter, VideoInfo};
use crate::surface::{Surface, SurfaceFlags, SurfaceId};
use std::sync::Arc;

pub struct VideoDevice {
    /// Configuration for the device.
    config: VideoConfig,
    /// Active display driver.
    driver: Box<dyn DisplayDriver + Send>,
    /// Surface conversion primitive.
    converter: Box<dyn SurfaceConverter + Send>,
    /// The surface currently on screen, once a mode has been set.
    visible: Option<Surface>,
}

impl VideoDevice {
    /// Creates a device with no mode set.
    ///
    /// If `config` is `None`, [`VideoConfig::default`] is used.
    pub fn new(
        config: Option<VideoConfig>,
        driver: Box<dyn DisplayDriver + Send>,
        converter: Box<dyn SurfaceConverter + Send>,
    ) -> Self {
        log::info!("video device using driver {}", driver.name());
        Self {
            config: config.unwrap_or_default(),
            driver,
            converter,
            visible: None,
        }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// The visible surface, if a mode has been set.
    pub fn video_surface(&self) -> Option<&Surface> {
        self.visible.as_ref()
    }

    /// Mutable access to the visible surface, for drawing.
    pub fn video_surface_mut(&mut self) -> Option<&mut Surface> {
        self.visible.as_mut()
    }

    pub fn video_info(&self) -> VideoInfo {
        self.driver.info()
    }

    /// Depth of the current display: the visible surface's, or the driver's native
    /// depth before the first mode switch.
    fn display_bpp(&self) -> u8 {
        match &self.visible {
            Some(surface) => surface.format().bits_per_pixel,
            None => self.driver.info().vfmt.bits_per_pixel,
        }
    }

    /// Sizes available at `format`, or at the current display format when `format` is
    /// `None`. Sizes are sorted largest first.
    pub fn list_modes(&self, format: Option<&PixelFormat>, flags: SurfaceFlags) -> ModeCatalogue {
        match format {
            Some(format) => self.driver.list_modes(format, flags),
            None => match &self.visible {
                Some(surface) => self.driver.list_modes(surface.format(), flags),
                None => self.driver.list_modes(&self.driver.info().vfmt, flags),
            },
        }
    }

    /// See [`modes::video_mode_ok`].
    pub fn video_mode_ok(&self, width: i32, height: i32, bpp: u8, flags: SurfaceFlags) -> u8 {
        modes::video_mode_ok(self.driver.as_ref(), width, height, bpp, flags)
    }

    /// See [`modes::get_video_mode`]. The current display depth is the last resort.
    pub fn get_video_mode(&self, mode: &mut VideoMode, flags: SurfaceFlags) -> Result<(), VideoError> {
        modes::get_video_mode(self.driver.as_ref(), mode, flags, self.display_bpp())
    }

    /// Negotiates the closest available mode, switches the display to it and makes the
    /// new surface visible. Returns the id of the visible surface.
    ///
    /// A `bpp` of 0 means the current display depth at any format. The display may end
    /// up at a different depth than requested whether or not `ANYFORMAT` is set, since
    /// no depth emulation takes place; check the returned surface's format.
    pub fn set_video_mode(
        &mut self,
        width: i32,
        height: i32,
        bpp: u8,
        mut flags: SurfaceFlags,
    ) -> Result<SurfaceId, VideoError> {
        let bpp = if bpp == 0 {
            flags |= SurfaceFlags::ANYFORMAT;
            self.display_bpp()
        } else {
            bpp
        };

        let mut mode = VideoMode::new(width, height, bpp);
        self.get_video_mode(&mut mode, flags)?;

        // Palettes only exist at 8 bits.
        if mode.bpp > 8 {
            flags.remove(SurfaceFlags::HWPALETTE);
        }

        let surface = self
            .driver
            .set_video_mode(mode.width as u32, mode.height as u32, mode.bpp, flags)
            .map_err(|e| set_error(VideoError::ModeSwitchFailed(e.to_string())))?;

        log::info!(
            "video mode {}x{}x{} ({}) on {}",
            surface.width(),
            surface.height(),
            surface.format().bits_per_pixel,
            surface.flags(),
            self.driver.name()
        );
        if mode.bpp != bpp && !flags.contains(SurfaceFlags::ANYFORMAT) {
            log::debug!("requested {bpp} bpp, display runs at {} bpp", mode.bpp);
        }

        let id = surface.id();
        self.visible = Some(surface);

        if self.config.clear_on_mode_set {
            self.clear_visible();
        }
        Ok(id)
    }

    fn clear_visible(&mut self) {
        let Some(surface) = self.visible.as_mut() else {
            return;
        };
        let black = surface.format().map_rgb(0, 0, 0);
        surface.fill(black);

        if surface.flags().contains(SurfaceFlags::FULLSCREEN) {
            let id = surface.id();
            self.flip(id);
        }
    }

    fn visible_or_error(&self) -> Result<&Surface, VideoError> {
        self.visible.as_ref().ok_or_else(|| set_error(VideoError::NoVideoMode))
    }

    /// Converts `surface` to the display format so it can be blitted at full speed.
    ///
    /// The result is a hardware surface only if the display is one and the driver
    /// accelerates hardware blits. Colour-key and alpha hints are kept; the RLE hint is
    /// inherited, or forced on when configured.
    pub fn display_format(&mut self, surface: &Surface) -> Result<Surface, VideoError> {
        let screen = self.visible_or_error()?;

        let mut flags = if screen.flags().contains(SurfaceFlags::HWSURFACE) && self.driver.info().blit_hw {
            SurfaceFlags::HWSURFACE
        } else {
            SurfaceFlags::SWSURFACE
        };
        if self.config.auto_rle_display_format {
            flags |= surface.flags() & (SurfaceFlags::SRCCOLORKEY | SurfaceFlags::SRCALPHA);
            flags |= SurfaceFlags::RLEACCELOK;
        } else {
            flags |= surface.flags() & (SurfaceFlags::SRCCOLORKEY | SurfaceFlags::SRCALPHA | SurfaceFlags::RLEACCELOK);
        }

        let format = screen.format().clone();
        log::debug!("display format conversion with flags {flags}");
        self.converter
            .convert_surface(surface, &format, flags)
            .ok_or_else(|| set_error(VideoError::ConversionFailed))
    }

    /// Converts `surface` to a 32-bit format with an alpha channel whose channel order
    /// suits the display (see [`alpha_format_masks`]).
    pub fn display_format_alpha(&mut self, surface: &Surface) -> Result<Surface, VideoError> {
        let screen = self.visible_or_error()?;

        let masks = alpha_format_masks(screen.format());
        let format = Arc::new(PixelFormat::new(32, masks));
        let flags = (screen.flags() & SurfaceFlags::HWSURFACE)
            | (surface.flags() & (SurfaceFlags::SRCALPHA | SurfaceFlags::RLEACCELOK));

        log::debug!("alpha display format {masks:?} with flags {flags}");
        self.converter
            .convert_surface(surface, &format, flags)
            .ok_or_else(|| set_error(VideoError::ConversionFailed))
    }

    /// Pushes damaged regions of the visible surface to the display.
    ///
    /// Does nothing unless `screen` is the visible surface. Rectangles are in surface
    /// coordinates; a letterboxed surface has them moved by the driver's offset before
    /// they are handed over. `rects` itself is never modified.
    pub fn update_rects(&mut self, screen: SurfaceId, rects: &[Rect]) {
        let Some(visible) = self.visible.as_ref() else {
            return;
        };
        if visible.id() != screen {
            return;
        }

        log::debug!("dispatching {} update rect(s)", rects.len());
        if visible.offset() != 0 {
            let (dx, dy) = self.driver.surface_offset();
            let moved: Vec<Rect> = rects.iter().map(|r| r.translate(dx, dy)).collect();
            self.driver.update_rects(&moved);
        } else {
            self.driver.update_rects(rects);
        }
    }

    /// Pushes one region of the visible surface to the display.
    ///
    /// A zero `width` or `height` stands for the full surface dimension. A region
    /// reaching past the right or bottom edge is dropped without an error.
    pub fn update_rect(&mut self, screen: SurfaceId, x: i32, y: i32, width: u32, height: u32) {
        let Some(visible) = self.visible.as_ref().filter(|s| s.id() == screen) else {
            return;
        };

        let width = if width == 0 { visible.width() } else { width };
        let height = if height == 0 { visible.height() } else { height };
        if x as i64 + width as i64 > visible.width() as i64 {
            return;
        }
        if y as i64 + height as i64 > visible.height() as i64 {
            return;
        }

        self.update_rects(screen, &[Rect::new(x, y, width, height)]);
    }

    /// Shows the whole visible surface.
    pub fn flip(&mut self, screen: SurfaceId) {
        self.update_rect(screen, 0, 0, 0, 0);
    }

    /// Installs `icon` as the window icon, with a mask derived from its colour key or
    /// alpha channel.
    pub fn set_icon(&mut self, icon: &Surface) {
        let mask = icon_mask(icon);
        self.driver.set_icon(icon, &mask);
    }

    /// Releases the display. The visible surface is dropped.
    pub fn video_quit(&mut self) {
        if self.visible.take().is_some() {
            log::info!("video mode released on {}", self.driver.name());
        }
        self.driver.video_quit();
    }
}

impl Drop for VideoDevice {
    fn drop(&mut self) {
        if self.visible.is_some() {
            self.video_quit();
        }
    }
}
