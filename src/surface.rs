//! Surfaces: a pixel buffer plus the format and flags describing it.

use crate::pixel::PixelFormat;
use crate::render::Rect;
use bitflags::bitflags;
use std::fmt::{Debug, Display};
use std::sync::Arc;
use uuid::Uuid;

bitflags! {
    /// Surface and mode-request flags.
    pub struct SurfaceFlags: u32 {
        /// Surface lives in system memory. This is the absence of `HWSURFACE`.
        const SWSURFACE   = 0x0000_0000;
        /// Surface lives in video memory.
        const HWSURFACE   = 0x0000_0001;
        /// Use asynchronous blits if possible.
        const ASYNCBLIT   = 0x0000_0004;
        /// Accept any depth for a mode request.
        const ANYFORMAT   = 0x1000_0000;
        /// Surface has an exclusive palette.
        const HWPALETTE   = 0x2000_0000;
        /// Double-buffered display.
        const DOUBLEBUF   = 0x4000_0000;
        /// Fullscreen display.
        const FULLSCREEN  = 0x8000_0000;
        /// Resizable window.
        const RESIZABLE   = 0x0000_0010;
        /// Window without title bar or frame.
        const NOFRAME     = 0x0000_0020;
        /// Blits to this surface use hardware acceleration.
        const HWACCEL     = 0x0000_0100;
        /// Blits honour the colour key.
        const SRCCOLORKEY = 0x0000_1000;
        /// Surface may be run-length encoded for faster colour-keyed blits.
        const RLEACCELOK  = 0x0000_2000;
        /// Surface is currently run-length encoded.
        const RLEACCEL    = 0x0000_4000;
        /// Blits use source alpha blending.
        const SRCALPHA    = 0x0001_0000;
        /// Pixel memory was supplied by the caller.
        const PREALLOC    = 0x0100_0000;
    }
}

impl Display for SurfaceFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.contains(SurfaceFlags::HWSURFACE) {
            parts.push("HwSurface");
        }
        if self.contains(SurfaceFlags::FULLSCREEN) {
            parts.push("Fullscreen");
        }
        if self.contains(SurfaceFlags::DOUBLEBUF) {
            parts.push("DoubleBuf");
        }
        if self.contains(SurfaceFlags::SRCCOLORKEY) {
            parts.push("ColorKey");
        }
        if self.contains(SurfaceFlags::SRCALPHA) {
            parts.push("Alpha");
        }
        if self.contains(SurfaceFlags::RLEACCELOK) {
            parts.push("RleOk");
        }

        if parts.is_empty() {
            write!(f, "SwSurface")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Identity of a surface. Used to recognise the visible surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A pixel buffer with its format and flags.
///
/// Rows are `pitch` bytes apart; pixels are stored in native byte order. Surfaces are
/// deliberately not `Clone`: every surface has its own [`SurfaceId`].
pub struct Surface {
    id: SurfaceId,
    flags: SurfaceFlags,
    format: Arc<PixelFormat>,
    width: u32,
    height: u32,
    pitch: usize,
    pixels: Vec<u8>,
    /// Byte offset of the visible origin inside a larger physical display. Non-zero
    /// only for letterboxed visible surfaces.
    offset: usize,
}

impl Surface {
    /// Allocates a zeroed surface. Rows are padded to a multiple of four bytes.
    pub fn new(width: u32, height: u32, format: Arc<PixelFormat>, flags: SurfaceFlags) -> Self {
        let row = width as usize * format.bytes_per_pixel as usize;
        let pitch = (row + 3) & !3;

        Self {
            id: SurfaceId::new(),
            flags,
            format,
            width,
            height,
            pitch,
            pixels: vec![0; pitch * height as usize],
            offset: 0,
        }
    }

    /// Marks this surface as centred inside a larger display, `offset` bytes in.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn flags(&self) -> SurfaceFlags {
        self.flags
    }

    pub fn format(&self) -> &Arc<PixelFormat> {
        &self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// The whole surface as a rectangle at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Enables colour keying with `key`, or disables it with `None`.
    ///
    /// The format is shared, so a new one is allocated if other surfaces still use it.
    pub fn set_color_key(&mut self, key: Option<u32>) {
        match key {
            Some(key) => {
                Arc::make_mut(&mut self.format).colorkey = key;
                self.flags.insert(SurfaceFlags::SRCCOLORKEY);
            }
            None => self.flags.remove(SurfaceFlags::SRCCOLORKEY),
        }
    }

    /// Enables or disables source alpha blending.
    pub fn set_alpha(&mut self, enabled: bool) {
        self.flags.set(SurfaceFlags::SRCALPHA, enabled);
    }

    /// Reads the raw pixel value at `(x, y)`.
    ///
    /// Panics if the coordinates are outside the surface.
    pub fn pixel_at(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let bpp = self.format.bytes_per_pixel as usize;
        let at = y as usize * self.pitch + x as usize * bpp;
        let px = &self.pixels[at..at + bpp];

        match bpp {
            1 => px[0] as u32,
            2 => u16::from_ne_bytes([px[0], px[1]]) as u32,
            3 => {
                if cfg!(target_endian = "little") {
                    px[0] as u32 | (px[1] as u32) << 8 | (px[2] as u32) << 16
                } else {
                    (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32
                }
            }
            _ => u32::from_ne_bytes([px[0], px[1], px[2], px[3]]),
        }
    }

    /// Writes the raw pixel value at `(x, y)`, truncated to the pixel width.
    ///
    /// Panics if the coordinates are outside the surface.
    pub fn put_pixel(&mut self, x: u32, y: u32, value: u32) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let bpp = self.format.bytes_per_pixel as usize;
        let at = y as usize * self.pitch + x as usize * bpp;
        let px = &mut self.pixels[at..at + bpp];

        match bpp {
            1 => px[0] = value as u8,
            2 => px.copy_from_slice(&(value as u16).to_ne_bytes()),
            3 => {
                let bytes = value.to_le_bytes();
                if cfg!(target_endian = "little") {
                    px.copy_from_slice(&bytes[..3]);
                } else {
                    px.copy_from_slice(&[bytes[2], bytes[1], bytes[0]]);
                }
            }
            _ => px.copy_from_slice(&value.to_ne_bytes()),
        }
    }

    /// Sets every pixel to `value`.
    pub fn fill(&mut self, value: u32) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.put_pixel(x, y, value);
            }
        }
    }
}

impl Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bpp", &self.format.bits_per_pixel)
            .field("flags", &self.flags.to_string())
            .field("offset", &self.offset)
            .finish()
    }
}
