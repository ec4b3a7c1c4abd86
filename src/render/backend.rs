use crate::pixel::PixelFormat;
use crate::render::Rect;
use crate::surface::{Surface, SurfaceFlags};
use std::sync::Arc;

/// Sizes a driver supports at one pixel format.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ModeCatalogue {
    /// Nothing is available at this format.
    #[default]
    Empty,
    /// Any size is accepted at this format (windowed drivers).
    AnySize,
    /// Explicit sizes, largest first.
    Sizes(Vec<Rect>),
}

impl ModeCatalogue {
    /// Returns `true` when no size at all is available.
    pub fn is_empty(&self) -> bool {
        match self {
            ModeCatalogue::Empty => true,
            ModeCatalogue::AnySize => false,
            ModeCatalogue::Sizes(sizes) => sizes.is_empty(),
        }
    }
}

/// Capability snapshot of the active driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    /// Hardware surfaces can be created.
    pub hw_available: bool,
    /// A window manager is available.
    pub wm_available: bool,
    /// Hardware to hardware blits are accelerated.
    pub blit_hw: bool,
    /// Colour-keyed hardware blits are accelerated.
    pub blit_hw_cc: bool,
    /// Alpha hardware blits are accelerated.
    pub blit_hw_a: bool,
    /// Software to hardware blits are accelerated.
    pub blit_sw: bool,
    /// Total video memory in kilobytes.
    pub video_mem: u32,
    /// Native (desktop) pixel format.
    pub vfmt: Arc<PixelFormat>,
}

/// Display driver interface. Calls occur on the thread that owns the video device.
///
/// Drivers report what they can do; all negotiation happens above them.
pub trait DisplayDriver {
    /// Short driver name, for logs.
    fn name(&self) -> &str;

    /// Current capabilities.
    fn info(&self) -> VideoInfo;

    /// Sizes available at `format` with `flags`. Only the depth of `format` is
    /// guaranteed to be meaningful.
    fn list_modes(&self, format: &PixelFormat, flags: SurfaceFlags) -> ModeCatalogue;

    /// Whether the driver can centre a smaller surface inside a larger mode.
    fn handles_any_size(&self) -> bool {
        false
    }

    /// Switches the display to `width` × `height` × `bpp` and returns the new visible
    /// surface. A letterboxed surface carries a non-zero [`Surface::offset`].
    fn set_video_mode(
        &mut self,
        width: u32,
        height: u32,
        bpp: u8,
        flags: SurfaceFlags,
    ) -> anyhow::Result<Surface>;

    /// Pushes the given rectangles, in physical display coordinates, to the screen.
    fn update_rects(&mut self, rects: &[Rect]);

    /// Position of the visible surface inside the physical display.
    fn surface_offset(&self) -> (i32, i32) {
        (0, 0)
    }

    /// Installs a window icon. `mask` holds one bit per pixel, rows padded to bytes.
    fn set_icon(&mut self, _icon: &Surface, _mask: &[u8]) {}

    /// Releases the display. The visible surface is gone after this.
    fn video_quit(&mut self) {}
}

/// Converts surfaces between pixel formats.
pub trait SurfaceConverter {
    /// Converts `src` into a new surface using `format` and `flags`. Returns `None`
    /// when the destination cannot be allocated.
    fn convert_surface(
        &mut self,
        src: &Surface,
        format: &Arc<PixelFormat>,
        flags: SurfaceFlags,
    ) -> Option<Surface>;
}
