//! Pixel formats and channel layouts.
//!
//! A [`PixelFormat`] describes how a pixel value is packed: its depth, the byte
//! width of one pixel, the four channel bitmasks and the colour key. Formats are
//! immutable once built and shared between surfaces through an `Arc`.

/// The four channel bitmasks of a packed pixel format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMasks {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

impl ChannelMasks {
    /// 32-bit ARGB with eight bits per channel. The fallback layout for alpha conversions.
    pub const ARGB8888: ChannelMasks = ChannelMasks {
        r: 0x00FF_0000,
        g: 0x0000_FF00,
        b: 0x0000_00FF,
        a: 0xFF00_0000,
    };

    pub const fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_empty(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0 && self.a == 0
    }
}

/// Shift and precision loss of one channel, derived from its mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct Channel {
    shift: u8,
    loss: u8,
}

impl Channel {
    fn from_mask(mask: u32) -> Self {
        if mask == 0 {
            return Self { shift: 0, loss: 8 };
        }
        Self {
            shift: mask.trailing_zeros() as u8,
            loss: 8 - mask.count_ones().min(8) as u8,
        }
    }
}

/// Layout of a packed pixel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub bytes_per_pixel: u8,
    pub masks: ChannelMasks,
    /// Pixel value treated as fully transparent when colour keying is enabled.
    pub colorkey: u32,
    channels: [Channel; 4],
}

impl PixelFormat {
    /// Builds a format for `bits_per_pixel` with the given channel masks.
    ///
    /// Packed depths (above 8 bits) with all-zero masks get the standard RGB layout for
    /// that depth: 565 for 16 bits, 555 for 15 bits and 888 for 24 and 32 bits. An
    /// 8-bit format with zero masks is indexed.
    pub fn new(bits_per_pixel: u8, masks: ChannelMasks) -> Self {
        let masks = if masks.is_empty() && bits_per_pixel > 8 {
            default_masks(bits_per_pixel)
        } else {
            masks
        };

        Self {
            bits_per_pixel,
            bytes_per_pixel: bits_per_pixel.div_ceil(8),
            masks,
            colorkey: 0,
            channels: [
                Channel::from_mask(masks.r),
                Channel::from_mask(masks.g),
                Channel::from_mask(masks.b),
                Channel::from_mask(masks.a),
            ],
        }
    }

    /// A format carrying only a depth, with every mask cleared. This is what mode
    /// catalogues are queried with.
    pub fn depth_only(bits_per_pixel: u8) -> Self {
        Self {
            bits_per_pixel,
            bytes_per_pixel: bits_per_pixel.div_ceil(8),
            masks: ChannelMasks::default(),
            colorkey: 0,
            channels: [Channel::from_mask(0); 4],
        }
    }

    /// Returns a copy of this format with a different colour key.
    pub fn with_colorkey(&self, colorkey: u32) -> Self {
        Self { colorkey, ..self.clone() }
    }

    /// Indexed formats have no channel masks; their pixels are palette entries.
    pub fn is_indexed(&self) -> bool {
        self.masks.is_empty()
    }

    /// Maps an opaque RGB triple to a pixel value. The alpha bits, if any, are all set.
    pub fn map_rgb(&self, r: u8, g: u8, b: u8) -> u32 {
        self.map_rgba(r, g, b, 0xFF)
    }

    /// Maps an RGBA quadruple to a pixel value.
    ///
    /// Indexed formats carry no palette here and always map to entry 0.
    pub fn map_rgba(&self, r: u8, g: u8, b: u8, a: u8) -> u32 {
        if self.is_indexed() {
            return 0;
        }
        let [rc, gc, bc, ac] = self.channels;
        ((r as u32 >> rc.loss) << rc.shift)
            | ((g as u32 >> gc.loss) << gc.shift)
            | ((b as u32 >> bc.loss) << bc.shift)
            | (((a as u32 >> ac.loss) << ac.shift) & self.masks.a)
    }
}

fn default_masks(bits_per_pixel: u8) -> ChannelMasks {
    let bpp = bits_per_pixel.min(24) as u32;
    let (third, rest) = (bpp / 3, bpp % 3);

    let r_loss = 8 - third;
    let r_shift = third + rest + third;
    let g_loss = 8 - third - rest;
    let g_shift = third;
    let b_loss = 8 - third;

    ChannelMasks {
        r: (0xFF >> r_loss) << r_shift,
        g: (0xFF >> g_loss) << g_shift,
        b: 0xFF >> b_loss,
        a: 0,
    }
}

/// Picks the 32-bit channel layout an alpha-bearing conversion should target, given
/// the display's format.
///
/// Layouts that match the display's channel order are preferred because the blitter
/// has fast paths for them; everything else gets [`ChannelMasks::ARGB8888`].
pub fn alpha_format_masks(display: &PixelFormat) -> ChannelMasks {
    let mut masks = ChannelMasks::ARGB8888;
    let vf = &display.masks;

    match display.bytes_per_pixel {
        2 => {
            // xBGR 565/555 displays expand to ABGR8888 by bit replication.
            if vf.r == 0x1F && (vf.b == 0xF800 || vf.b == 0x7C00) {
                masks.r = 0xFF;
                masks.b = 0xFF_0000;
            }
        }
        3 | 4 => {
            if vf.r == 0xFF && vf.b == 0xFF_0000 {
                masks.r = 0xFF;
                masks.b = 0xFF_0000;
            } else if vf.r == 0xFF00 && vf.b == 0xFF00_0000 {
                masks = ChannelMasks::new(0x0000_FF00, 0x00FF_0000, 0xFF00_0000, 0x0000_00FF);
            }
        }
        _ => {}
    }

    masks
}
