//! Error type and the last-error slot.
//!
//! Every failing operation returns a [`VideoError`] and also records it with
//! [`set_error`], so callers that only look at sentinel values can still ask
//! what went wrong through [`get_error`].

use lazy_static::lazy_static;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoError {
    #[error("Invalid bits per pixel {0} (range is {{8...32}})")]
    InvalidBitsPerPixel(u8),

    #[error("Invalid width or height ({width}x{height})")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("No video mode large enough for {width}x{height}")]
    NoModeLargeEnough { width: i32, height: i32 },

    #[error("No video mode has been set")]
    NoVideoMode,

    #[error("Surface conversion failed")]
    ConversionFailed,

    #[error("Mode switch failed: {0}")]
    ModeSwitchFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

lazy_static! {
    static ref LAST_ERROR: Mutex<Option<VideoError>> = Mutex::new(None);
}

#[cfg(test)]
lazy_static! {
    static ref SLOT_GUARD: Mutex<()> = Mutex::new(());
}

/// Serializes tests that record errors, since they all share [`LAST_ERROR`].
#[cfg(test)]
pub(crate) fn lock_error_slot() -> std::sync::MutexGuard<'static, ()> {
    SLOT_GUARD.lock().unwrap_or_else(|e| e.into_inner())
}

/// Records `err` as the last error and hands it back, so failure paths can end with
/// `return Err(set_error(..))`.
pub fn set_error(err: VideoError) -> VideoError {
    log::warn!("{err}");
    if let Ok(mut slot) = LAST_ERROR.lock() {
        *slot = Some(err.clone());
    }
    err
}

/// Returns the message of the most recently recorded error, if any.
pub fn get_error() -> Option<String> {
    LAST_ERROR.lock().ok()?.as_ref().map(|e| e.to_string())
}

pub fn clear_error() {
    if let Ok(mut slot) = LAST_ERROR.lock() {
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_values() {
        assert_eq!(
            VideoError::InvalidBitsPerPixel(4).to_string(),
            "Invalid bits per pixel 4 (range is {8...32})"
        );
        assert_eq!(
            VideoError::NoModeLargeEnough { width: 1920, height: 1200 }.to_string(),
            "No video mode large enough for 1920x1200"
        );
        assert_eq!(VideoError::NoVideoMode.to_string(), "No video mode has been set");
    }

    #[test]
    fn set_error_returns_the_error_and_records_it() {
        let _slot = lock_error_slot();
        let err = set_error(VideoError::Config("bad".into()));
        assert_eq!(err, VideoError::Config("bad".into()));
        assert_eq!(get_error().as_deref(), Some("Configuration error: bad"));
    }

    #[test]
    fn later_errors_replace_earlier_ones() {
        let _slot = lock_error_slot();
        set_error(VideoError::ConversionFailed);
        set_error(VideoError::InvalidBitsPerPixel(40));
        assert_eq!(get_error().as_deref(), Some("Invalid bits per pixel 40 (range is {8...32})"));
    }

    #[test]
    fn clear_error_empties_the_slot() {
        let _slot = lock_error_slot();
        set_error(VideoError::NoVideoMode);
        clear_error();
        assert_eq!(get_error(), None);
    }
}
