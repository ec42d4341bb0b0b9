//! Energy-threshold heuristic detector.
//!
//! [`HeuristicDetector`] classifies a clip as scream-like when its mean-square
//! energy reaches a configured threshold.  It always reports the raw energy
//! scalar so the session can display a meter even on negative cycles.
//!
//! The detector is stateless and deterministic; scaling a clip's amplitude by
//! a factor > 1 can only raise the energy score, never lower it.

use crate::detect::features::FeatureVector;
use crate::detect::policy::DetectionResult;

// ---------------------------------------------------------------------------
// HeuristicDetector
// ---------------------------------------------------------------------------

/// Threshold detector over the shared feature pipeline.
///
/// # Example
///
/// ```rust
/// use scream_watch::audio::AudioClip;
/// use scream_watch::detect::{FeatureExtractor, HeuristicDetector};
///
/// let extractor = FeatureExtractor::new();
/// let detector = HeuristicDetector::new(0.45);
///
/// let quiet = extractor.extract(&AudioClip::new(vec![0.1; 4_410], 44_100));
/// let result = detector.detect(&quiet);
/// assert!(!result.is_scream);
/// assert!(result.confidence > 0.0); // raw energy is still reported
/// ```
pub struct HeuristicDetector {
    /// Mean-square energy at or above which a clip is classified as a scream.
    energy_threshold: f32,
}

impl HeuristicDetector {
    /// Create a detector with the given energy threshold.
    ///
    /// The threshold is a calibration constant supplied by configuration
    /// (default `0.45`); it is never baked in at call sites.
    pub fn new(energy_threshold: f32) -> Self {
        Self { energy_threshold }
    }

    /// Energy threshold currently in use.
    pub fn threshold(&self) -> f32 {
        self.energy_threshold
    }

    /// Classify a clip from its extracted features.
    ///
    /// `confidence` carries the raw mean-square energy clamped to `[0, 1]`
    /// regardless of the boolean outcome.  The comparison is inclusive,
    /// matching the classifier's decision rule.
    pub fn detect(&self, features: &FeatureVector) -> DetectionResult {
        let energy = if features.energy.is_finite() {
            features.energy.clamp(0.0, 1.0)
        } else {
            0.0
        };

        DetectionResult {
            is_scream: energy >= self.energy_threshold,
            confidence: energy,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
