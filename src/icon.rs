//! Visibility masks for window icons.
//!
//! A mask holds one bit per icon pixel, most significant bit first, each row padded
//! to a whole byte. A set bit means the pixel is shown. Masks start all ones and
//! transparent pixels are cleared.

use crate::surface::{Surface, SurfaceFlags};
use bitflags::bitflags;

bitflags! {
    /// Which transparency sources to honour when building a mask.
    pub struct MaskFlags: u8 {
        /// Pixels equal to the colour key are transparent.
        const COLORKEY = 0x01;
        /// Pixels whose alpha bits are all zero are transparent.
        const ALPHA    = 0x02;
    }
}

/// Bytes in one mask row for an icon `width` pixels wide.
pub fn mask_pitch(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Bytes needed for the mask of `icon`.
pub fn mask_len(icon: &Surface) -> usize {
    mask_pitch(icon.width()) * icon.height() as usize
}

#[inline]
fn clear_bit(mask: &mut [u8], pitch: usize, x: u32, y: u32) {
    mask[y as usize * pitch + x as usize / 8] &= !(0x01 << (7 - x % 8));
}

/// Clears the mask bit of every transparent pixel in `icon`.
///
/// 8-bit icons are compared against the colour key whatever `flags` says, since they
/// have no alpha channel. 16- and 32-bit icons honour `flags`. 24-bit icons are left
/// untouched.
///
/// Panics if `mask` is shorter than [`mask_len`].
pub fn create_mask_from_colorkey_or_alpha(icon: &Surface, mask: &mut [u8], flags: MaskFlags) {
    assert!(mask.len() >= mask_len(icon), "icon mask buffer too small");

    let pitch = mask_pitch(icon.width());
    let format = icon.format();
    let colorkey = format.colorkey;
    let amask = format.masks.a;

    match format.bytes_per_pixel {
        1 => {
            for y in 0..icon.height() {
                for x in 0..icon.width() {
                    if icon.pixel_at(x, y) == colorkey {
                        clear_bit(mask, pitch, x, y);
                    }
                }
            }
        }
        2 | 4 => {
            for y in 0..icon.height() {
                for x in 0..icon.width() {
                    let pixel = icon.pixel_at(x, y);
                    let keyed = flags.contains(MaskFlags::COLORKEY) && pixel == colorkey;
                    let clear = flags.contains(MaskFlags::ALPHA) && pixel & amask == 0;
                    if keyed || clear {
                        clear_bit(mask, pitch, x, y);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Builds the mask for `icon`, honouring its colour key when `SRCCOLORKEY` is set and
/// its alpha channel when `SRCALPHA` is set and the format has alpha bits.
pub fn icon_mask(icon: &Surface) -> Vec<u8> {
    let mut mask = vec![0xFF; mask_len(icon)];

    let mut flags = MaskFlags::empty();
    if icon.flags().contains(SurfaceFlags::SRCCOLORKEY) {
        flags |= MaskFlags::COLORKEY;
    }
    if icon.flags().contains(SurfaceFlags::SRCALPHA) && icon.format().masks.a != 0 {
        flags |= MaskFlags::ALPHA;
    }
    if !flags.is_empty() {
        create_mask_from_colorkey_or_alpha(icon, &mut mask, flags);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ChannelMasks, PixelFormat};
    use std::sync::Arc;

    fn icon(width: u32, height: u32, bpp: u8, masks: ChannelMasks, colorkey: u32) -> Surface {
        let format = PixelFormat::new(bpp, masks).with_colorkey(colorkey);
        Surface::new(width, height, Arc::new(format), SurfaceFlags::SWSURFACE)
    }

    #[test]
    fn pitch_rounds_up_to_bytes() {
        assert_eq!(mask_pitch(1), 1);
        assert_eq!(mask_pitch(8), 1);
        assert_eq!(mask_pitch(9), 2);
        assert_eq!(mask_pitch(32), 4);
    }

    #[test]
    fn colorkey_pixel_is_cleared_when_requested() {
        let mut img = icon(1, 1, 16, ChannelMasks::default(), 0xF81F);
        img.put_pixel(0, 0, 0xF81F);

        let mut mask = vec![0xFF; 1];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::COLORKEY);
        assert_eq!(mask[0] & 0x80, 0);
    }

    #[test]
    fn colorkey_pixel_kept_in_alpha_only_mode() {
        let masks = ChannelMasks::new(0x0F00, 0x00F0, 0x000F, 0xF000);
        let mut img = icon(1, 1, 16, masks, 0xF81F);
        img.put_pixel(0, 0, 0xF81F);

        let mut mask = vec![0xFF; 1];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::ALPHA);
        assert_eq!(mask[0] & 0x80, 0x80);
    }

    #[test]
    fn transparent_alpha_pixels_are_cleared() {
        let mut img = icon(3, 2, 32, ChannelMasks::ARGB8888, 0);
        img.fill(0xFF00_0000);
        img.put_pixel(1, 0, 0x00FF_FFFF);
        img.put_pixel(2, 1, 0x0000_0000);

        let mut mask = vec![0xFF; mask_len(&img)];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::ALPHA);
        assert_eq!(mask, vec![0b1011_1111, 0b1101_1111]);
    }

    #[test]
    fn both_modes_combine() {
        let mut img = icon(2, 1, 32, ChannelMasks::ARGB8888, 0xFF00_FF00);
        img.put_pixel(0, 0, 0xFF00_FF00);
        img.put_pixel(1, 0, 0x0012_3456);

        let mut mask = vec![0xFF];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::COLORKEY | MaskFlags::ALPHA);
        assert_eq!(mask, vec![0b0011_1111]);
    }

    #[test]
    fn indexed_icons_always_use_the_colorkey() {
        let mut img = icon(10, 2, 8, ChannelMasks::default(), 3);
        img.fill(1);
        img.put_pixel(0, 0, 3);
        img.put_pixel(9, 1, 3);

        let mut mask = vec![0xFF; mask_len(&img)];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::empty());
        assert_eq!(mask, vec![0b0111_1111, 0xFF, 0xFF, 0b1011_1111]);
    }

    #[test]
    fn three_byte_icons_are_ignored() {
        let img = icon(4, 4, 24, ChannelMasks::default(), 0);
        let mut mask = vec![0xFF; mask_len(&img)];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::COLORKEY | MaskFlags::ALPHA);
        assert!(mask.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn bits_are_only_ever_cleared() {
        let img = icon(8, 1, 32, ChannelMasks::ARGB8888, 1);
        let mut mask = vec![0b1010_1010];
        create_mask_from_colorkey_or_alpha(&img, &mut mask, MaskFlags::COLORKEY);
        assert_eq!(mask, vec![0b1010_1010]);
    }

    #[test]
    fn icon_mask_follows_surface_flags() {
        let mut img = icon(2, 1, 32, ChannelMasks::ARGB8888, 0);
        img.fill(0xFF00_0000);
        img.put_pixel(1, 0, 0x00FF_FFFF);
        assert_eq!(icon_mask(&img), vec![0xFF]);

        img.set_alpha(true);
        assert_eq!(icon_mask(&img), vec![0b1011_1111]);

        img.set_alpha(false);
        img.set_color_key(Some(0xFF00_0000));
        assert_eq!(icon_mask(&img), vec![0b0111_1111]);
    }

    #[test]
    fn icon_mask_ignores_alpha_flag_without_alpha_bits() {
        let mut img = icon(2, 1, 32, ChannelMasks::default(), 0);
        img.set_alpha(true);
        assert_eq!(icon_mask(&img), vec![0xFF]);
    }
}
