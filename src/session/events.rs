//! Detection event persistence, alert log, and capture history.
//!
//! Three collaborating stores, all plain text/WAV files so an operator can
//! inspect them without tooling:
//!
//! * [`EventLog`] — on an actionable verdict, writes the clip as a 16-bit
//!   WAV under `detections/audio/` and appends a structured entry to
//!   `detections/logs/detection_log.txt`; alerts additionally append a
//!   banner to `emergency_log.txt`.
//! * [`CaptureHistory`] — a rolling record of the last N capture cycles
//!   (timestamp, peak amplitude, mean energy), rewritten each cycle.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::audio::AudioClip;
use crate::detect::FusedVerdict;

// ---------------------------------------------------------------------------
// EventError
// ---------------------------------------------------------------------------

/// Errors that can occur while persisting events or reading history.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write event WAV: {0}")]
    Wav(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// DetectionEvent
// ---------------------------------------------------------------------------

/// One persisted detection event.
#[derive(Debug, Clone)]
pub struct DetectionEvent {
    /// Human-readable local timestamp (`YYYY-MM-DD HH:MM:SS`).
    pub timestamp: String,
    /// Classifier confidence at detection time.
    pub ml_confidence: f32,
    /// Heuristic energy at detection time.
    pub energy_level: f32,
    /// Peak absolute amplitude of the clip.
    pub peak: f32,
    /// Clip duration in seconds.
    pub duration_secs: f32,
    /// Clip sample rate in Hz.
    pub sample_rate: u32,
    /// Path of the saved WAV clip.
    pub audio_path: PathBuf,
}

// ---------------------------------------------------------------------------
// RecordingInfo
// ---------------------------------------------------------------------------

/// Summary of one saved detection WAV, as shown by the `history` command.
#[derive(Debug, Clone)]
pub struct RecordingInfo {
    /// File name (e.g. `scream_2025-01-07 14-03-22.wav`).
    pub file_name: String,
    /// File size in kilobytes.
    pub size_kb: f32,
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Writes detection events and alert banners to their on-disk locations.
pub struct EventLog {
    audio_dir: PathBuf,
    log_file: PathBuf,
    emergency_log_file: PathBuf,
}

impl EventLog {
    /// Create an event log rooted at the given locations.
    pub fn new(
        audio_dir: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
        emergency_log_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            log_file: log_file.into(),
            emergency_log_file: emergency_log_file.into(),
        }
    }

    /// Persist one detection: WAV clip plus a structured log entry.
    ///
    /// Directories are created on demand.  Returns the persisted
    /// [`DetectionEvent`] so the caller can display it.
    pub fn save_detection(
        &self,
        clip: &AudioClip,
        verdict: &FusedVerdict,
    ) -> Result<DetectionEvent, EventError> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        // Colons are not valid in file names on all platforms.
        let file_stamp = timestamp.replace(':', "-");

        fs::create_dir_all(&self.audio_dir)?;
        if let Some(parent) = self.log_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let audio_path = self.audio_dir.join(format!("scream_{file_stamp}.wav"));
        write_wav(&audio_path, clip)?;

        let event = DetectionEvent {
            timestamp,
            ml_confidence: verdict.ml_confidence,
            energy_level: verdict.energy_level,
            peak: clip.peak(),
            duration_secs: clip.duration_secs(),
            sample_rate: clip.sample_rate,
            audio_path,
        };

        let mut log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        writeln!(log, "\n=== New Detection Event ===")?;
        writeln!(log, "Timestamp: {}", event.timestamp)?;
        writeln!(log, "ML Confidence: {:.4}", event.ml_confidence)?;
        writeln!(log, "Energy Level: {:.4}", event.energy_level)?;
        writeln!(log, "Peak Amplitude: {:.4}", event.peak)?;
        writeln!(log, "Recording Duration: {:.2} seconds", event.duration_secs)?;
        writeln!(log, "Sample Rate: {} Hz", event.sample_rate)?;
        writeln!(
            log,
            "Audio File: {}",
            event
                .audio_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        )?;
        writeln!(log, "{}", "-".repeat(50))?;

        log::info!("detection saved: {}", event.audio_path.display());
        Ok(event)
    }

    /// Append an alert banner to the emergency log.
    pub fn append_alert(&self, ml_confidence: f32) -> Result<(), EventError> {
        if let Some(parent) = self.emergency_log_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.emergency_log_file)?;
        writeln!(log, "{}", "!".repeat(50))?;
        writeln!(log, "SCREAM DETECTED at {timestamp}")?;
        writeln!(log, "Confidence: {ml_confidence:.2}")?;
        writeln!(log, "{}", "!".repeat(50))?;
        Ok(())
    }

    /// Read the full detection log, or `None` when no events exist yet.
    pub fn read_log(&self) -> Result<Option<String>, EventError> {
        if !self.log_file.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.log_file)?))
    }

    /// List saved detection WAVs, newest first.
    pub fn list_recordings(&self) -> Result<Vec<RecordingInfo>, EventError> {
        if !self.audio_dir.exists() {
            return Ok(Vec::new());
        }

        let mut recordings = Vec::new();
        for entry in fs::read_dir(&self.audio_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".wav") {
                continue;
            }
            let size_kb = entry.metadata()?.len() as f32 / 1024.0;
            recordings.push(RecordingInfo {
                file_name: name,
                size_kb,
            });
        }

        recordings.sort_by(|a, b| b.file_name.cmp(&a.file_name));
        Ok(recordings)
    }
}

/// Write `clip` as a 16-bit mono WAV.
fn write_wav(path: &Path, clip: &AudioClip) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate.max(1),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &clip.samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize()
}

// ---------------------------------------------------------------------------
// CaptureHistory
// ---------------------------------------------------------------------------

/// One capture cycle's summary statistics.
#[derive(Debug, Clone)]
struct CaptureEntry {
    timestamp: String,
    max_amplitude: f32,
    mean_energy: f32,
}

/// Rolling record of recent capture cycles, rewritten to disk each cycle.
pub struct CaptureHistory {
    file: PathBuf,
    max_entries: usize,
    entries: Vec<CaptureEntry>,
}

impl CaptureHistory {
    /// Create a history keeping at most `max_entries` cycles.
    pub fn new(file: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            file: file.into(),
            max_entries: max_entries.max(1),
            entries: Vec::new(),
        }
    }

    /// Record one cycle and rewrite the history file.
    pub fn record(&mut self, clip: &AudioClip, mean_energy: f32) -> Result<(), EventError> {
        self.entries.push(CaptureEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            max_amplitude: clip.peak(),
            mean_energy,
        });
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = fs::File::create(&self.file)?;
        writeln!(out, "=== Audio Recording History ===")?;
        for entry in &self.entries {
            writeln!(out)?;
            writeln!(out, "Timestamp: {}", entry.timestamp)?;
            writeln!(out, "Max Amplitude: {:.4}", entry.max_amplitude)?;
            writeln!(out, "Mean Energy: {:.4}", entry.mean_energy)?;
            writeln!(out, "{}", "-".repeat(30))?;
        }
        Ok(())
    }

    /// Number of cycles currently held in memory.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no cycles have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
