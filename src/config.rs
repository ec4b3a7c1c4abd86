use crate::errors::{set_error, VideoError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Video layer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Always mark display-format conversions as eligible for run-length acceleration,
    /// instead of inheriting the source surface's own RLE hint.
    pub auto_rle_display_format: bool,
    /// Clear a freshly switched visible surface to black (and flip it when fullscreen).
    pub clear_on_mode_set: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            auto_rle_display_format: cfg!(feature = "autorle"),
            clear_on_mode_set: true,
        }
    }
}

impl VideoConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, VideoError> {
        serde_json::from_str(json).map_err(|e| set_error(VideoError::Config(e.to_string())))
    }

    /// Loads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| set_error(VideoError::Config(format!("{}: {e}", path.display()))))?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::lock_error_slot;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = VideoConfig::default();
        assert!(cfg.clear_on_mode_set);
        assert_eq!(cfg.auto_rle_display_format, cfg!(feature = "autorle"));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg = VideoConfig::from_json(r#"{ "auto_rle_display_format": true }"#).unwrap();
        assert!(cfg.auto_rle_display_format);
        assert!(cfg.clear_on_mode_set);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let _slot = lock_error_slot();
        let err = VideoConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, VideoError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "clear_on_mode_set": false }}"#).unwrap();

        let cfg = VideoConfig::load(file.path()).unwrap();
        assert!(!cfg.clear_on_mode_set);
    }

    #[test]
    fn load_missing_file_fails() {
        let _slot = lock_error_slot();
        let dir = tempfile::tempdir().unwrap();
        let err = VideoConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, VideoError::Config(_)));
    }
}
