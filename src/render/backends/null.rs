use crate::pixel::{ChannelMasks, PixelFormat};
use crate::render::backend::{DisplayDriver, ModeCatalogue, SurfaceConverter, VideoInfo};
use crate::render::Rect;
use crate::surface::{Surface, SurfaceFlags, SurfaceId};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Rectangle batches received by a [`NullDriver`], in arrival order.
pub type UpdateLog = Arc<Mutex<Vec<Vec<Rect>>>>;

/// Null display driver that does not touch any hardware.
///
/// The catalogue, capabilities and letterbox offset are configured up front; every
/// update batch is recorded in a shared [`UpdateLog`].
pub struct NullDriver {
    native: Arc<PixelFormat>,
    modes: HashMap<u8, ModeCatalogue>,
    hw_available: bool,
    blit_hw: bool,
    any_size: bool,
    offset: (i32, i32),
    refuse_switch: bool,
    updates: UpdateLog,
    icon: Arc<Mutex<Option<(SurfaceId, Vec<u8>)>>>,
}

impl NullDriver {
    /// Creates a driver whose native format has the standard layout for `native_bpp`.
    /// No modes are available until [`with_modes`](Self::with_modes) is called.
    pub fn new(native_bpp: u8) -> Self {
        Self::with_native_format(PixelFormat::new(native_bpp, ChannelMasks::default()))
    }

    pub fn with_native_format(native: PixelFormat) -> Self {
        Self {
            native: Arc::new(native),
            modes: HashMap::new(),
            hw_available: false,
            blit_hw: false,
            any_size: false,
            offset: (0, 0),
            refuse_switch: false,
            updates: Arc::new(Mutex::new(Vec::new())),
            icon: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the catalogue reported at `bpp`.
    pub fn with_modes(mut self, bpp: u8, modes: ModeCatalogue) -> Self {
        self.modes.insert(bpp, modes);
        self
    }

    /// Reports hardware surfaces and accelerated hardware blits.
    pub fn with_hardware_blit(mut self, enabled: bool) -> Self {
        self.hw_available = enabled;
        self.blit_hw = enabled;
        self
    }

    /// Lets the driver centre smaller surfaces inside larger modes.
    pub fn with_any_size(mut self, enabled: bool) -> Self {
        self.any_size = enabled;
        self
    }

    /// Places every visible surface at `(x, y)` inside the physical display. Negative
    /// coordinates are clamped to 0, a surface cannot start outside the display.
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = (x.max(0), y.max(0));
        self
    }

    /// Makes every mode switch fail.
    pub fn refusing_mode_switch(mut self) -> Self {
        self.refuse_switch = true;
        self
    }

    /// Shared handle on the recorded update batches.
    pub fn update_log(&self) -> UpdateLog {
        self.updates.clone()
    }

    /// Shared handle on the last installed icon and its mask.
    pub fn icon_log(&self) -> Arc<Mutex<Option<(SurfaceId, Vec<u8>)>>> {
        self.icon.clone()
    }
}

impl DisplayDriver for NullDriver {
    fn name(&self) -> &str {
        "NullDriver"
    }

    fn info(&self) -> VideoInfo {
        VideoInfo {
            hw_available: self.hw_available,
            wm_available: false,
            blit_hw: self.blit_hw,
            blit_hw_cc: self.blit_hw,
            blit_hw_a: false,
            blit_sw: false,
            video_mem: 0,
            vfmt: self.native.clone(),
        }
    }

    fn list_modes(&self, format: &PixelFormat, _flags: SurfaceFlags) -> ModeCatalogue {
        self.modes.get(&format.bits_per_pixel).cloned().unwrap_or_default()
    }

    fn handles_any_size(&self) -> bool {
        self.any_size
    }

    fn set_video_mode(&mut self, width: u32, height: u32, bpp: u8, flags: SurfaceFlags) -> Result<Surface> {
        if self.refuse_switch {
            bail!("NullDriver refuses to switch to {width}x{height}x{bpp}");
        }

        let format = if bpp == self.native.bits_per_pixel {
            self.native.clone()
        } else {
            Arc::new(PixelFormat::new(bpp, ChannelMasks::default()))
        };
        let keep = SurfaceFlags::FULLSCREEN | SurfaceFlags::DOUBLEBUF | SurfaceFlags::HWPALETTE;
        let mut surface_flags = flags & keep;
        if self.hw_available && flags.contains(SurfaceFlags::HWSURFACE) {
            surface_flags |= SurfaceFlags::HWSURFACE;
        }

        let surface = Surface::new(width, height, format, surface_flags);
        let (x, y) = self.offset;
        let offset = y as usize * surface.pitch() + x as usize * surface.format().bytes_per_pixel as usize;
        Ok(surface.with_offset(offset))
    }

    fn update_rects(&mut self, rects: &[Rect]) {
        if let Ok(mut log) = self.updates.lock() {
            log.push(rects.to_vec());
        }
    }

    fn surface_offset(&self) -> (i32, i32) {
        self.offset
    }

    fn set_icon(&mut self, icon: &Surface, mask: &[u8]) {
        if let Ok(mut slot) = self.icon.lock() {
            *slot = Some((icon.id(), mask.to_vec()));
        }
    }
}

/// A conversion the [`NullConverter`] was asked to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: SurfaceId,
    pub format: PixelFormat,
    pub flags: SurfaceFlags,
}

/// Conversion primitive that allocates the destination surface but copies no pixels.
#[derive(Default)]
pub struct NullConverter {
    fail: bool,
    requests: Arc<Mutex<Vec<ConversionRequest>>>,
}

impl NullConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter whose allocations always fail.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Shared handle on every conversion requested so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<ConversionRequest>>> {
        self.requests.clone()
    }
}

impl SurfaceConverter for NullConverter {
    fn convert_surface(&mut self, src: &Surface, format: &Arc<PixelFormat>, flags: SurfaceFlags) -> Option<Surface> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(ConversionRequest {
                source: src.id(),
                format: (**format).clone(),
                flags,
            });
        }

        if self.fail {
            return None;
        }
        Some(Surface::new(src.width(), src.height(), format.clone(), flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_depths_have_no_modes() {
        let driver = NullDriver::new(32).with_modes(16, ModeCatalogue::AnySize);
        let flags = SurfaceFlags::FULLSCREEN;
        assert_eq!(driver.list_modes(&PixelFormat::depth_only(16), flags), ModeCatalogue::AnySize);
        assert_eq!(driver.list_modes(&PixelFormat::depth_only(24), flags), ModeCatalogue::Empty);
    }

    #[test]
    fn mode_switch_uses_native_format_at_native_depth() {
        let mut driver = NullDriver::new(32);
        let native = driver.info().vfmt;
        let s = driver.set_video_mode(64, 48, 32, SurfaceFlags::SWSURFACE).unwrap();
        assert!(Arc::ptr_eq(s.format(), &native));
        assert_eq!(s.offset(), 0);

        let s = driver.set_video_mode(64, 48, 16, SurfaceFlags::SWSURFACE).unwrap();
        assert_eq!(s.format().bits_per_pixel, 16);
    }

    #[test]
    fn hardware_flag_only_when_available() {
        let mut soft = NullDriver::new(32);
        let s = soft.set_video_mode(8, 8, 32, SurfaceFlags::HWSURFACE).unwrap();
        assert!(!s.flags().contains(SurfaceFlags::HWSURFACE));

        let mut hard = NullDriver::new(32).with_hardware_blit(true);
        let s = hard.set_video_mode(8, 8, 32, SurfaceFlags::HWSURFACE).unwrap();
        assert!(s.flags().contains(SurfaceFlags::HWSURFACE));
    }

    #[test]
    fn offset_marks_surface() {
        let mut driver = NullDriver::new(32).with_offset(2, 1);
        let s = driver.set_video_mode(10, 10, 32, SurfaceFlags::FULLSCREEN).unwrap();
        assert_eq!(s.offset(), s.pitch() + 8);
    }

    #[test]
    fn negative_offset_is_clamped() {
        let mut driver = NullDriver::new(32).with_offset(-5, 3);
        assert_eq!(driver.surface_offset(), (0, 3));
        let s = driver.set_video_mode(10, 10, 32, SurfaceFlags::FULLSCREEN).unwrap();
        assert_eq!(s.offset(), 3 * s.pitch());

        let mut driver = NullDriver::new(32).with_offset(-1, -1);
        assert_eq!(driver.surface_offset(), (0, 0));
        let s = driver.set_video_mode(10, 10, 32, SurfaceFlags::FULLSCREEN).unwrap();
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn refusing_driver_fails() {
        let mut driver = NullDriver::new(32).refusing_mode_switch();
        assert!(driver.set_video_mode(10, 10, 32, SurfaceFlags::SWSURFACE).is_err());
    }

    #[test]
    fn converter_records_and_allocates() {
        let mut conv = NullConverter::new();
        let log = conv.requests();
        let src = Surface::new(3, 2, Arc::new(PixelFormat::new(16, ChannelMasks::default())), SurfaceFlags::SWSURFACE);
        let dst_format = Arc::new(PixelFormat::new(32, ChannelMasks::ARGB8888));

        let out = conv.convert_surface(&src, &dst_format, SurfaceFlags::SRCALPHA).unwrap();
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.format().masks, ChannelMasks::ARGB8888);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].source, src.id());
        assert_eq!(log[0].flags, SurfaceFlags::SRCALPHA);
    }

    #[test]
    fn failing_converter_returns_none() {
        let mut conv = NullConverter::failing();
        let src = Surface::new(1, 1, Arc::new(PixelFormat::depth_only(8)), SurfaceFlags::SWSURFACE);
        assert!(conv.convert_surface(&src, src.format(), SurfaceFlags::SWSURFACE).is_none());
    }
}
