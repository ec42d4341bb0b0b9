//! Trained-classifier detector.
//!
//! # Overview
//!
//! [`ScreamModel`] is the capability interface the detection core depends on:
//! an opaque, pre-trained scorer mapping a [`FeatureVector`] to a raw
//! confidence.  It is object-safe and `Send + Sync` so it can be held behind
//! a `Box<dyn ScreamModel>` and injected into [`ModelDetector`].
//!
//! [`LogisticModel`] is the production implementation — a standardized
//! logistic scorer loaded once from a JSON artifact produced by the training
//! pipeline (the artifact format is the trainer's contract, not ours).
//!
//! [`MockModel`] (available under `#[cfg(test)]`) returns a pre-configured
//! score so the fusion and session layers can be tested without an artifact
//! on disk.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::detect::features::{FeatureVector, FEATURE_COUNT};
use crate::detect::policy::DetectionResult;

// ---------------------------------------------------------------------------
// ModelError
// ---------------------------------------------------------------------------

/// All errors that can arise from the classifier subsystem.
///
/// Load-time variants ([`NotFound`](Self::NotFound), [`Corrupt`](Self::Corrupt))
/// are fatal to a detection session — the caller must abort startup rather
/// than run half-initialized.  [`Inference`](Self::Inference) is recoverable:
/// the detector absorbs it into a neutral score.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The model artifact was not found at the given path.
    #[error("model artifact not found: {0}")]
    NotFound(String),

    /// The artifact exists but could not be parsed or failed validation.
    #[error("model artifact corrupt: {0}")]
    Corrupt(String),

    /// The model produced an unusable output for one scoring call.
    #[error("inference fault: {0}")]
    Inference(String),
}

// ---------------------------------------------------------------------------
// ScreamModel trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for pre-trained scream classifiers.
///
/// # Contract
///
/// - `predict` must be deterministic for a fixed model and input.
/// - The returned raw score is interpreted by [`ModelDetector`], which clamps
///   it to `[0, 1]`; implementations need not clamp themselves.
/// - Implementations are immutable after construction.
pub trait ScreamModel: Send + Sync {
    /// Score `features` and return a raw confidence.
    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelError>;
}

// Compile-time assertion: Box<dyn ScreamModel> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ScreamModel>) {}
};

// ---------------------------------------------------------------------------
// LogisticModel
// ---------------------------------------------------------------------------

/// On-disk layout of the trained artifact (JSON).
///
/// All vectors are bound to the fixed feature order of
/// [`FeatureVector::as_array`].
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    /// One weight per feature.
    weights: Vec<f32>,
    /// Intercept term.
    bias: f32,
    /// Per-feature standardization means.
    means: Vec<f32>,
    /// Per-feature standardization scales (must be positive).
    scales: Vec<f32>,
}

/// Production classifier: standardized logistic regression over the fixed
/// feature vector.
///
/// Loaded once at startup via [`LogisticModel::load`]; immutable and freely
/// shareable across scoring calls thereafter.
#[derive(Debug)]
pub struct LogisticModel {
    weights: [f32; FEATURE_COUNT],
    bias: f32,
    means: [f32; FEATURE_COUNT],
    scales: [f32; FEATURE_COUNT],
}

impl LogisticModel {
    /// Load and validate a trained artifact from `path`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::NotFound`] — `path` does not exist or is unreadable.
    /// - [`ModelError::Corrupt`]  — JSON parse failure, wrong vector lengths,
    ///   non-finite parameters, or non-positive scales.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::NotFound(format!("{}: {e}", path.display())))?;

        let artifact: ModelArtifact = serde_json::from_str(&content)
            .map_err(|e| ModelError::Corrupt(format!("{}: {e}", path.display())))?;

        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let weights = to_feature_array(&artifact.weights, "weights")?;
        let means = to_feature_array(&artifact.means, "means")?;
        let scales = to_feature_array(&artifact.scales, "scales")?;

        if !artifact.bias.is_finite() {
            return Err(ModelError::Corrupt("bias is not finite".into()));
        }
        if scales.iter().any(|&s| s <= 0.0) {
            return Err(ModelError::Corrupt("scales must be positive".into()));
        }

        Ok(Self {
            weights,
            bias: artifact.bias,
            means,
            scales,
        })
    }
}

fn to_feature_array(values: &[f32], name: &str) -> Result<[f32; FEATURE_COUNT], ModelError> {
    if values.len() != FEATURE_COUNT {
        return Err(ModelError::Corrupt(format!(
            "{name}: expected {FEATURE_COUNT} entries, got {}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::Corrupt(format!("{name}: non-finite entry")));
    }

    let mut array = [0.0_f32; FEATURE_COUNT];
    array.copy_from_slice(values);
    Ok(array)
}

impl ScreamModel for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        let x = features.as_array();

        let mut z = self.bias;
        for i in 0..FEATURE_COUNT {
            z += self.weights[i] * (x[i] - self.means[i]) / self.scales[i];
        }

        // Logistic link; z is finite because artifact and features are.
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

// ---------------------------------------------------------------------------
// ModelDetector
// ---------------------------------------------------------------------------

/// Wraps a [`ScreamModel`] with a decision threshold and per-cycle fault
/// absorption.
///
/// A failed or non-finite prediction is logged and scored as confidence
/// `0.0`, `is_scream = false` — one bad cycle never terminates the session.
pub struct ModelDetector {
    model: Box<dyn ScreamModel>,
    /// Confidence at or above which the clip is classified as a scream.
    decision_threshold: f32,
}

impl ModelDetector {
    /// Build a detector around an already-constructed model
    /// (dependency injection — the classifier implementation is swappable).
    pub fn new(model: Box<dyn ScreamModel>, decision_threshold: f32) -> Self {
        Self {
            model,
            decision_threshold,
        }
    }

    /// Load the JSON artifact at `path` and wrap it.
    ///
    /// # Errors
    ///
    /// Propagates [`ModelError::NotFound`] / [`ModelError::Corrupt`] from
    /// [`LogisticModel::load`]; these are fatal to the session.
    pub fn load(path: impl AsRef<Path>, decision_threshold: f32) -> Result<Self, ModelError> {
        let model = LogisticModel::load(path)?;
        Ok(Self::new(Box::new(model), decision_threshold))
    }

    /// Decision threshold currently in use.
    pub fn threshold(&self) -> f32 {
        self.decision_threshold
    }

    /// Score `features` with the loaded model.
    ///
    /// The raw model output is clamped to `[0, 1]`; `is_scream` is
    /// `confidence >= decision_threshold`.  Inference faults are absorbed as
    /// a neutral negative result.
    pub fn score(&self, features: &FeatureVector) -> DetectionResult {
        let confidence = match self.model.predict(features) {
            Ok(raw) if raw.is_finite() => raw.clamp(0.0, 1.0),
            Ok(raw) => {
                log::warn!("model returned non-finite score ({raw}); treating as 0.0");
                0.0
            }
            Err(e) => {
                log::warn!("model inference failed ({e}); treating as 0.0");
                0.0
            }
        };

        DetectionResult {
            is_scream: confidence >= self.decision_threshold,
            confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// MockModel  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured score without any artifact.
#[cfg(test)]
pub struct MockModel {
    response: Result<f32, ModelError>,
}

#[cfg(test)]
impl MockModel {
    /// Create a mock that always returns `Ok(score)`.
    pub fn scoring(score: f32) -> Self {
        Self {
            response: Ok(score),
        }
    }

    /// Create a mock that always fails with an inference fault.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(ModelError::Inference(message.into())),
        }
    }
}

#[cfg(test)]
impl ScreamModel for MockModel {
    fn predict(&self, _features: &FeatureVector) -> Result<f32, ModelError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_artifact(json: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut file = std::fs::File::create(dir.path().join("model.json")).expect("create");
        file.write_all(json.as_bytes()).expect("write");
        dir
    }

    fn valid_json() -> String {
        r#"{
            "weights": [2.0, 0.5, 0.5, 1.0, 1.0, 0.5],
            "bias": -1.0,
            "means": [0.1, 0.3, 0.2, 1500.0, 4000.0, 0.3],
            "scales": [0.2, 0.3, 0.2, 1500.0, 4000.0, 0.3]
        }"#
        .to_string()
    }

    // ---- LogisticModel::load ----

    #[test]
    fn load_missing_artifact_returns_not_found() {
        let result = LogisticModel::load("/nonexistent/model.json");
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn load_invalid_json_returns_corrupt() {
        let dir = write_artifact("{ not json");
        let result = LogisticModel::load(dir.path().join("model.json"));
        assert!(matches!(result, Err(ModelError::Corrupt(_))));
    }

    #[test]
    fn load_wrong_weight_count_returns_corrupt() {
        let dir = write_artifact(
            r#"{"weights": [1.0], "bias": 0.0,
                "means": [0,0,0,0,0,0], "scales": [1,1,1,1,1,1]}"#,
        );
        let err = LogisticModel::load(dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Corrupt(_)), "{err}");
        assert!(err.to_string().contains("weights"));
    }

    #[test]
    fn load_non_positive_scale_returns_corrupt() {
        let dir = write_artifact(
            r#"{"weights": [0,0,0,0,0,0], "bias": 0.0,
                "means": [0,0,0,0,0,0], "scales": [1,1,0.0,1,1,1]}"#,
        );
        let err = LogisticModel::load(dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Corrupt(_)), "{err}");
    }

    #[test]
    fn load_valid_artifact_succeeds() {
        let dir = write_artifact(&valid_json());
        let model = LogisticModel::load(dir.path().join("model.json")).expect("load");
        // Zero feature vector must score without error.
        let score = model.predict(&FeatureVector::zero()).expect("predict");
        assert!((0.0..=1.0).contains(&score));
    }

    // ---- LogisticModel::predict ----

    #[test]
    fn predict_is_deterministic() {
        let dir = write_artifact(&valid_json());
        let model = LogisticModel::load(dir.path().join("model.json")).expect("load");

        let features = FeatureVector {
            energy: 0.5,
            peak: 0.9,
            zcr: 0.4,
            centroid: 3_000.0,
            rolloff: 8_000.0,
            flatness: 0.6,
        };
        let a = model.predict(&features).unwrap();
        let b = model.predict(&features).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn higher_energy_raises_score_with_positive_weight() {
        let dir = write_artifact(&valid_json());
        let model = LogisticModel::load(dir.path().join("model.json")).expect("load");

        let quiet = FeatureVector {
            energy: 0.05,
            ..FeatureVector::zero()
        };
        let loud = FeatureVector {
            energy: 0.8,
            ..FeatureVector::zero()
        };
        assert!(model.predict(&loud).unwrap() > model.predict(&quiet).unwrap());
    }

    // ---- ModelDetector ----

    #[test]
    fn detector_clamps_raw_output() {
        let detector = ModelDetector::new(Box::new(MockModel::scoring(3.7)), 0.45);
        let result = detector.score(&FeatureVector::zero());
        assert_eq!(result.confidence, 1.0);
        assert!(result.is_scream);
    }

    #[test]
    fn detector_threshold_is_inclusive() {
        let detector = ModelDetector::new(Box::new(MockModel::scoring(0.45)), 0.45);
        assert!(detector.score(&FeatureVector::zero()).is_scream);
    }

    #[test]
    fn inference_fault_scores_neutral_negative() {
        let detector = ModelDetector::new(Box::new(MockModel::failing("boom")), 0.45);
        let result = detector.score(&FeatureVector::zero());
        assert!(!result.is_scream);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn non_finite_output_scores_neutral_negative() {
        let detector = ModelDetector::new(Box::new(MockModel::scoring(f32::NAN)), 0.45);
        let result = detector.score(&FeatureVector::zero());
        assert!(!result.is_scream);
        assert_eq!(result.confidence, 0.0);
    }

    /// Loading a model then immediately scoring a zero vector must not fail
    /// regardless of model internals.
    #[test]
    fn load_then_score_zero_vector_round_trip() {
        let dir = write_artifact(&valid_json());
        let detector = ModelDetector::load(dir.path().join("model.json"), 0.45).expect("load");
        let result = detector.score(&FeatureVector::zero());
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    // ---- object safety ----

    #[test]
    fn box_dyn_scream_model_compiles() {
        let model: Box<dyn ScreamModel> = Box::new(MockModel::scoring(0.9));
        assert!((model.predict(&FeatureVector::zero()).unwrap() - 0.9).abs() < 1e-6);
    }
}
