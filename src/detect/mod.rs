//! Detection core — feature extraction, the two detectors, and fusion.
//!
//! # Architecture
//!
//! ```text
//! AudioClip ──▶ FeatureExtractor ──▶ FeatureVector
//!                                       │
//!                     ┌─────────────────┴──────────────────┐
//!                     ▼                                    ▼
//!              HeuristicDetector                     ModelDetector
//!              (energy threshold)                (ScreamModel + threshold)
//!                     │                                    │
//!                     └──────────▶ DecisionPolicy ◀────────┘
//!                                  (AND + cooldown)
//!                                        │
//!                                        ▼
//!                                  FusedVerdict
//! ```
//!
//! Everything in this module is pure computation over an in-memory clip —
//! no files, no devices, no notification channels.  [`DetectionEngine`] ties
//! the four pieces together for one synchronous scoring cycle.

pub mod engine;
pub mod features;
pub mod heuristic;
pub mod model;
pub mod policy;

pub use engine::DetectionEngine;
pub use features::{FeatureExtractor, FeatureVector, FEATURE_COUNT};
pub use heuristic::HeuristicDetector;
pub use model::{LogisticModel, ModelDetector, ModelError, ScreamModel};
pub use policy::{DecisionPolicy, DetectionResult, FusedVerdict};

// test-only re-export so integration-style tests can stub the classifier
// without `use scream_watch::detect::model::MockModel`.
#[cfg(test)]
pub use model::MockModel;
