//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\scream-watch\
//!   macOS:   ~/Library/Application Support/scream-watch/
//!   Linux:   ~/.config/scream-watch/
//!
//! Data dir (model artifact, detections, capture history):
//!   Windows: %LOCALAPPDATA%\scream-watch\
//!   macOS:   ~/Library/Application Support/scream-watch/
//!   Linux:   ~/.local/share/scream-watch/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the trained model artifact (`scream-model.json`).
    pub model_file: PathBuf,
    /// Directory for detection event WAV clips.
    pub detections_audio_dir: PathBuf,
    /// Full path to the detection event log.
    pub detection_log_file: PathBuf,
    /// Full path to the emergency alert log.
    pub emergency_log_file: PathBuf,
    /// Full path to the rolling capture-history file.
    pub capture_history_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "scream-watch";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self::rooted(config_dir, data_dir)
    }

    /// Build paths under explicit roots (useful for tests).
    pub fn rooted(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        let settings_file = config_dir.join("settings.toml");
        let model_file = data_dir.join("scream-model.json");
        let detections_dir = data_dir.join("detections");
        let detections_audio_dir = detections_dir.join("audio");
        let detection_log_file = detections_dir.join("logs").join("detection_log.txt");
        let emergency_log_file = data_dir.join("emergency_log.txt");
        let capture_history_file = data_dir.join("history").join("capture_history.txt");

        Self {
            config_dir,
            settings_file,
            model_file,
            detections_audio_dir,
            detection_log_file,
            emergency_log_file,
            capture_history_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .model_file
            .file_name()
            .is_some_and(|n| n == "scream-model.json"));
    }

    #[test]
    fn rooted_layout_matches_original_tree() {
        let paths = AppPaths::rooted(PathBuf::from("/cfg"), PathBuf::from("/data"));
        assert_eq!(
            paths.detections_audio_dir,
            PathBuf::from("/data/detections/audio")
        );
        assert_eq!(
            paths.detection_log_file,
            PathBuf::from("/data/detections/logs/detection_log.txt")
        );
        assert_eq!(
            paths.capture_history_file,
            PathBuf::from("/data/history/capture_history.txt")
        );
    }
}
