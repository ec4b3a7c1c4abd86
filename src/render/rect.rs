//! Rectangles in surface or display coordinates.
//!
//! A [`Rect`] is used both for mode sizes reported by a driver (where only the
//! width and height matter) and for damage regions pushed to the display.
//!
//! # Examples
//!
//! ```
//! use video_negotiation::render::Rect;
//!
//! let damage = Rect::new(10, 20, 100, 50);
//! let on_screen = damage.translate(32, 24);
//! assert_eq!((on_screen.x, on_screen.y), (42, 44));
//! assert_eq!(on_screen.width, 100);
//! ```

/// An axis-aligned rectangle.
#[derive(Clone, Eq, PartialEq, Copy, Default, Hash)]
pub struct Rect {
    /// Horizontal position in pixels.
    pub x: i32,

    /// Vertical position in pixels.
    pub y: i32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect {{ x: {}, y: {}, width: {}, height: {} }}", self.x, self.y, self.width, self.height)
    }
}

impl Rect {
    /// Creates a new [`Rect`] with the given position and size.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A rectangle of the given size at the origin. Mode catalogues are lists of these.
    pub const fn size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns a copy moved by `(dx, dy)`. Coordinates wrap on overflow.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            ..*self
        }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when this rectangle is at least `width` × `height` in both dimensions.
    pub fn dominates(&self, width: u32, height: u32) -> bool {
        self.width >= width && self.height >= height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_keeps_size() {
        let r = Rect::new(-5, 7, 3, 4).translate(10, -7);
        assert_eq!(r, Rect::new(5, 0, 3, 4));
    }

    #[test]
    fn translate_wraps_instead_of_overflowing() {
        let r = Rect::new(i32::MAX - 5, i32::MIN + 1, 1, 1).translate(10, -3);
        assert_eq!(r, Rect::new(i32::MIN + 4, i32::MAX - 1, 1, 1));
    }

    #[test]
    fn dominates_needs_both_dimensions() {
        let r = Rect::size(800, 600);
        assert!(r.dominates(800, 600));
        assert!(r.dominates(640, 480));
        assert!(!r.dominates(801, 480));
        assert!(!r.dominates(640, 601));
    }

    #[test]
    fn area_does_not_overflow() {
        assert_eq!(Rect::size(u32::MAX, 2).area(), u32::MAX as u64 * 2);
    }
}
