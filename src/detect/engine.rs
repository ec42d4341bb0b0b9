//! One-cycle detection engine.
//!
//! [`DetectionEngine`] owns the extractor, both detectors and the fusion
//! policy, and exposes the single scoring entry point used by the live
//! monitor and the offline analyzer alike.  One call to
//! [`score`](DetectionEngine::score) is one synchronous detection cycle:
//! extract once, score twice, fuse.

use std::time::Duration;

use crate::audio::AudioClip;
use crate::detect::features::FeatureExtractor;
use crate::detect::heuristic::HeuristicDetector;
use crate::detect::model::ModelDetector;
use crate::detect::policy::{DecisionPolicy, FusedVerdict};

// ---------------------------------------------------------------------------
// DetectionEngine
// ---------------------------------------------------------------------------

/// The assembled detection core.
///
/// Construct with [`DetectionEngine::new`]; the model detector is injected so
/// callers (and tests) control which [`crate::detect::ScreamModel`] backs it.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use scream_watch::audio::AudioClip;
/// use scream_watch::detect::{DetectionEngine, ModelDetector};
///
/// let model = ModelDetector::load("scream-model.json", 0.45)
///     .expect("model artifact is required to start a session");
/// let mut engine = DetectionEngine::new(0.45, model, Duration::from_secs(5));
///
/// let clip = AudioClip::new(vec![0.0; 44_100 * 3], 44_100);
/// let verdict = engine.score(&clip);
/// assert!(!verdict.detected);
/// ```
pub struct DetectionEngine {
    extractor: FeatureExtractor,
    heuristic: HeuristicDetector,
    model: ModelDetector,
    policy: DecisionPolicy,
}

impl DetectionEngine {
    /// Assemble an engine from its calibration parameters and a loaded model
    /// detector.
    pub fn new(energy_threshold: f32, model: ModelDetector, cooldown: Duration) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            heuristic: HeuristicDetector::new(energy_threshold),
            model,
            policy: DecisionPolicy::new(cooldown),
        }
    }

    /// Run one detection cycle over `clip`.
    ///
    /// Features are extracted once and shared by both detectors so their
    /// scores are comparable across runs.  Degenerate input (empty clip,
    /// zero sample rate) flows through as the zero-feature vector and scores
    /// as silence — this never fails and never panics.
    pub fn score(&mut self, clip: &AudioClip) -> FusedVerdict {
        let features = self.extractor.extract(clip);

        let heuristic = self.heuristic.detect(&features);
        let model = self.model.score(&features);

        let verdict = self.policy.fuse(heuristic, model);

        log::debug!(
            "cycle: energy = {:.4}, ml = {:.4}, detected = {}, actionable = {}",
            verdict.energy_level,
            verdict.ml_confidence,
            verdict.detected,
            verdict.actionable
        );

        verdict
    }

    /// Clear the fusion cooldown, e.g. when a new monitoring session starts.
    pub fn reset(&mut self) {
        self.policy.reset();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
