//! Mode negotiation against a driver's catalogue.
//!
//! Requests name a size and a depth. Drivers only know a fixed catalogue per depth,
//! so negotiation walks a ranked list of alternative depths:
//!
//! - [`video_mode_ok`] finds the first depth, in closeness order, at which the exact
//!   size (or, for drivers that can letterbox, a size at least as large) exists.
//! - [`get_video_mode`] falls back to the smallest catalogue size that still covers
//!   the request, rewriting the request to match.

use crate::errors::{set_error, VideoError};
use crate::pixel::PixelFormat;
use crate::render::{DisplayDriver, ModeCatalogue, Rect};
use crate::surface::SurfaceFlags;

/// Closeness ordering per depth bucket (8, 15/16, 24, 32 bits).
///
/// Slot 0 stands for the requested depth and slot 7 for the fallback depth; both are
/// filled in per query by [`closest_depths`]. A zero ends a row.
pub const DEPTH_CLOSENESS: [[u8; 8]; 4] = [
    [0, 8, 16, 15, 32, 24, 0, 0],
    [0, 16, 15, 32, 24, 8, 0, 0],
    [0, 24, 32, 16, 15, 8, 0, 0],
    [0, 32, 16, 15, 24, 8, 0, 0],
];

/// A requested or negotiated display mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoMode {
    pub width: i32,
    pub height: i32,
    pub bpp: u8,
}

impl VideoMode {
    pub fn new(width: i32, height: i32, bpp: u8) -> Self {
        Self { width, height, bpp }
    }
}

/// Row of [`DEPTH_CLOSENESS`] used for `bpp`: 8 → 0, 9..=16 → 1, 17..=24 → 2, 25..=32 → 3.
pub fn depth_bucket(bpp: u8) -> usize {
    (bpp as usize).div_ceil(8).clamp(1, 4) - 1
}

/// Depths to try, in order, for a request in `bucket`.
///
/// The walk starts at `requested`, continues along the bucket's row and ends with
/// `fallback` (pass 0 for none). Each depth appears once.
pub fn closest_depths(bucket: usize, requested: u8, fallback: u8) -> Vec<u8> {
    let mut row = DEPTH_CLOSENESS[bucket];
    row[0] = requested;
    row[7] = fallback;

    let mut order = Vec::with_capacity(row.len());
    let body = row[..7].iter().take_while(|&&d| d != 0);
    for &depth in body.chain(std::iter::once(&row[7])) {
        if depth != 0 && !order.contains(&depth) {
            order.push(depth);
        }
    }
    order
}

fn size_available(catalogue: &ModeCatalogue, width: u32, height: u32, letterbox: bool) -> bool {
    match catalogue {
        ModeCatalogue::Empty => false,
        ModeCatalogue::AnySize => true,
        ModeCatalogue::Sizes(sizes) if letterbox => sizes.iter().any(|s| s.dominates(width, height)),
        ModeCatalogue::Sizes(sizes) => sizes.iter().any(|s| s.width == width && s.height == height),
    }
}

/// Checks whether `width` × `height` can be shown at `bpp` or a nearby depth.
///
/// Returns the first depth in closeness order at which the size is available, which
/// is not necessarily `bpp`, or 0 if it is available nowhere or the request is out of
/// range.
pub fn video_mode_ok(driver: &dyn DisplayDriver, width: i32, height: i32, bpp: u8, flags: SurfaceFlags) -> u8 {
    if !(8..=32).contains(&bpp) {
        return 0;
    }
    if width <= 0 || height <= 0 {
        return 0;
    }

    let (w, h) = (width as u32, height as u32);
    let letterbox = driver.handles_any_size();

    for depth in closest_depths(depth_bucket(bpp), bpp, 0) {
        let catalogue = driver.list_modes(&PixelFormat::depth_only(depth), flags);
        if size_available(&catalogue, w, h, letterbox) {
            log::debug!("{width}x{height}x{bpp} available at {depth} bpp");
            return depth;
        }
    }
    0
}

/// Picks the catalogue entry closest to `width` × `height` from above.
///
/// A candidate must cover the request, be no larger than the current best in at least
/// one dimension, and have no more pixels. The current best starts as the first entry
/// whether or not that entry covers the request.
fn closest_size(sizes: &[Rect], width: u32, height: u32) -> Option<Rect> {
    let mut best = *sizes.first()?;
    let mut found = false;

    for size in sizes {
        if !size.dominates(width, height) {
            continue;
        }
        if (size.width <= best.width || size.height <= best.height) && size.area() <= best.area() {
            best = *size;
            found = true;
        }
    }

    found.then_some(best)
}

/// Resolves `mode` to something the driver can show without emulation.
///
/// A depth change alone is tried first (see [`video_mode_ok`]). Failing that, each
/// depth in closeness order, followed by `native_bpp`, is searched for the smallest
/// size covering the request, and `mode` is rewritten to the winner.
pub fn get_video_mode(
    driver: &dyn DisplayDriver,
    mode: &mut VideoMode,
    flags: SurfaceFlags,
    native_bpp: u8,
) -> Result<(), VideoError> {
    if !(8..=32).contains(&mode.bpp) {
        return Err(set_error(VideoError::InvalidBitsPerPixel(mode.bpp)));
    }
    if mode.width <= 0 || mode.height <= 0 {
        return Err(set_error(VideoError::InvalidDimensions {
            width: mode.width,
            height: mode.height,
        }));
    }

    let depth = video_mode_ok(driver, mode.width, mode.height, mode.bpp, flags);
    if depth == mode.bpp {
        return Ok(());
    }
    if depth > 0 {
        log::debug!("using {depth} bpp instead of {} bpp", mode.bpp);
        mode.bpp = depth;
        return Ok(());
    }

    let (w, h) = (mode.width as u32, mode.height as u32);
    for depth in closest_depths(depth_bucket(mode.bpp), mode.bpp, native_bpp) {
        let ModeCatalogue::Sizes(sizes) = driver.list_modes(&PixelFormat::depth_only(depth), flags) else {
            continue;
        };
        if let Some(best) = closest_size(&sizes, w, h) {
            log::debug!(
                "closest mode to {}x{}x{} is {}x{}x{depth}",
                mode.width,
                mode.height,
                mode.bpp,
                best.width,
                best.height
            );
            mode.width = best.width as i32;
            mode.height = best.height as i32;
            mode.bpp = depth;
            return Ok(());
        }
    }

    Err(set_error(VideoError::NoModeLargeEnough {
        width: mode.width,
        height: mode.height,
    }))
}
