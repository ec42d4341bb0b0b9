//! scream-watch — dual-detector scream monitoring.
//!
//! The crate continuously samples microphone audio in fixed-length cycles and
//! scores each clip with two independent detectors:
//!
//! * a hand-tuned energy detector ([`detect::HeuristicDetector`]), and
//! * a pre-trained statistical classifier ([`detect::ModelDetector`]).
//!
//! A detection fires only when **both** agree ([`detect::DecisionPolicy`]),
//! and a per-session cooldown suppresses repeated alerts.  The detection core
//! is pure computation over an in-memory [`audio::AudioClip`]; all file,
//! device and alert side effects live in [`session`].

pub mod audio;
pub mod config;
pub mod detect;
pub mod session;

pub use audio::AudioClip;
pub use detect::{DetectionEngine, FusedVerdict};
