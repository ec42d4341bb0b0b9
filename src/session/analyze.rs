//! Offline scoring of WAV files.
//!
//! `analyze` runs the exact same [`DetectionEngine`] the live monitor uses
//! over a file on disk, so a saved detection clip (or any recording) can be
//! re-scored after calibration changes.

use std::path::Path;

use thiserror::Error;

use crate::audio::{downmix_to_mono, AudioClip};
use crate::detect::{DetectionEngine, FusedVerdict};

// ---------------------------------------------------------------------------
// AnalyzeError
// ---------------------------------------------------------------------------

/// Errors that can occur while analyzing a WAV file.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported WAV sample format: {bits}-bit {format:?}")]
    UnsupportedFormat {
        bits: u16,
        format: hound::SampleFormat,
    },
}

// ---------------------------------------------------------------------------
// FileReport
// ---------------------------------------------------------------------------

/// Scoring report for one analyzed file.
#[derive(Debug)]
pub struct FileReport {
    /// File name as given.
    pub file_name: String,
    /// Clip duration in seconds.
    pub duration_secs: f32,
    /// Sample rate of the file in Hz.
    pub sample_rate: u32,
    /// Peak absolute amplitude after downmixing.
    pub peak: f32,
    /// The fused verdict.
    pub verdict: FusedVerdict,
}

// ---------------------------------------------------------------------------
// analyze_file
// ---------------------------------------------------------------------------

/// Load `path` as a mono [`AudioClip`] and score it with `engine`.
///
/// Multi-channel files are downmixed by averaging; 16-bit integer samples are
/// normalized to `[-1.0, 1.0]` and `f32` files are used as-is.
///
/// # Errors
///
/// Returns [`AnalyzeError::Wav`] when the file cannot be opened or decoded,
/// or [`AnalyzeError::UnsupportedFormat`] for sample formats other than
/// 16-bit integer and 32-bit float.
pub fn analyze_file(
    engine: &mut DetectionEngine,
    path: impl AsRef<Path>,
) -> Result<FileReport, AnalyzeError> {
    let path = path.as_ref();
    let clip = load_wav(path)?;
    let verdict = engine.score(&clip);

    Ok(FileReport {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        duration_secs: clip.duration_secs(),
        sample_rate: clip.sample_rate,
        peak: clip.peak(),
        verdict,
    })
}

/// Decode a WAV file into a normalized mono clip.
fn load_wav(path: &Path) -> Result<AudioClip, AnalyzeError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32_768.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Float, 32) => {
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
        (format, bits) => return Err(AnalyzeError::UnsupportedFormat { bits, format }),
    };

    let mono = downmix_to_mono(&interleaved, spec.channels);
    Ok(AudioClip::new(mono, spec.sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{MockModel, ModelDetector};
    use std::time::Duration;
    use tempfile::tempdir;

    fn engine(model_score: f32) -> DetectionEngine {
        let model = ModelDetector::new(Box::new(MockModel::scoring(model_score)), 0.45);
        DetectionEngine::new(0.45, model, Duration::from_secs(5))
    }

    fn write_i16_wav(path: &Path, samples: &[i16], channels: u16, rate: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn silent_file_scores_negative() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("silence.wav");
        write_i16_wav(&path, &vec![0i16; 44_100], 1, 44_100);

        let mut engine = engine(0.9);
        let report = analyze_file(&mut engine, &path).expect("analyze");

        assert_eq!(report.file_name, "silence.wav");
        assert!((report.duration_secs - 1.0).abs() < 1e-3);
        assert!(!report.verdict.detected);
        assert_eq!(report.peak, 0.0);
    }

    #[test]
    fn loud_file_with_confident_model_detects() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("loud.wav");
        let samples: Vec<i16> = (0..44_100)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        write_i16_wav(&path, &samples, 1, 44_100);

        let mut engine = engine(0.9);
        let report = analyze_file(&mut engine, &path).expect("analyze");

        assert!(report.verdict.detected);
        assert!(report.verdict.energy_level > 0.45);
        assert!(report.peak > 0.99);
    }

    #[test]
    fn stereo_file_is_downmixed() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        // L = full scale, R = inverted → mono mix cancels to near zero.
        let samples: Vec<i16> = (0..2_000)
            .map(|i| if i % 2 == 0 { 16_000 } else { -16_000 })
            .collect();
        write_i16_wav(&path, &samples, 2, 44_100);

        let mut engine = engine(0.9);
        let report = analyze_file(&mut engine, &path).expect("analyze");

        assert_eq!(report.sample_rate, 44_100);
        assert!(report.peak < 1e-3);
        assert!(!report.verdict.detected);
    }

    #[test]
    fn float_wav_is_supported() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..1_000 {
            writer
                .write_sample(if i % 2 == 0 { 0.5f32 } else { -0.5 })
                .unwrap();
        }
        writer.finalize().unwrap();

        let mut engine = engine(0.0);
        let report = analyze_file(&mut engine, &path).expect("analyze");
        assert!((report.peak - 0.5).abs() < 1e-6);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut engine = engine(0.0);
        let result = analyze_file(&mut engine, "/nonexistent/clip.wav");
        assert!(matches!(result, Err(AnalyzeError::Wav(_))));
    }
}
