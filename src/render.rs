pub mod backend;

/// Display drivers and conversion primitives.
pub mod backends {
    /// Headless driver used for tests and demos
    pub mod null;
}

mod rect;

pub use backend::{DisplayDriver, ModeCatalogue, SurfaceConverter, VideoInfo};
pub use rect::Rect;
