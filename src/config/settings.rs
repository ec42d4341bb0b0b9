//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared freely.

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DetectorConfig
// ---------------------------------------------------------------------------

/// Calibration constants for the detection core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Mean-square energy at or above which the heuristic detector fires.
    ///
    /// Also used as the display boundary on the console meters.
    pub energy_threshold: f32,
    /// Classifier confidence at or above which the model detector fires.
    pub confidence_threshold: f32,
    /// Minimum seconds between two externally-actionable positive verdicts.
    pub cooldown_secs: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.45,
            confidence_threshold: 0.45,
            cooldown_secs: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for per-cycle microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Length of each monitoring cycle's recording, in seconds.
    pub cycle_secs: f32,
    /// Idle pause between cycles, in seconds.
    pub pause_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            cycle_secs: 3.0,
            pause_secs: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

/// Settings for capture-history bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of recent capture cycles kept in the rolling history file.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 10 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use scream_watch::config::{AppConfig, AppPaths};
///
/// // First run writes the defaults so the operator has a file to edit.
/// let paths = AppPaths::new();
/// let config = AppConfig::load_or_init(&paths.settings_file).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Detection core calibration.
    pub detector: DetectorConfig,
    /// Capture cycle settings.
    pub audio: AudioConfig,
    /// Capture-history settings.
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Load configuration from `path`, writing the defaults there first when
    /// no settings file exists yet (first run), so the operator always has a
    /// file to edit.
    ///
    /// # Errors
    ///
    /// Fails when an existing file cannot be read or parsed, or when the
    /// initial defaults cannot be written.
    pub fn load_or_init(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }
        Self::load_from(path)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
