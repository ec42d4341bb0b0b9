//! Audio plumbing — microphone input and per-cycle clip assembly.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback (downmix to mono) → Vec<f32> batches (mpsc)
//!           → ClipBuffer → AudioClip → detection core
//! ```
//!
//! The detection core never touches this module; it only receives the
//! finished [`AudioClip`].

pub mod capture;
pub mod clip;

pub use capture::{CaptureError, Microphone, StreamHandle};
pub use clip::{downmix_to_mono, AudioClip, ClipBuffer};
