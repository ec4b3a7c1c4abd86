//! Display mode negotiation and visible-surface management on top of pluggable
//! display drivers.

pub mod config;
pub mod errors;
pub mod icon;
pub mod modes;
pub mod pixel;
pub mod render;
pub mod surface;
pub mod video;

pub use config::VideoConfig;
pub use errors::VideoError;
pub use modes::VideoMode;
pub use video::VideoDevice;
