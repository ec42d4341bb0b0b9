//! Session layer — everything around the detection core that touches the
//! outside world.
//!
//! # Responsibilities
//!
//! * [`recorder`] — drains capture batches into one [`crate::audio::AudioClip`]
//!   per monitoring cycle.
//! * [`monitor`] — the live loop: record → score → meters → alert + persist.
//! * [`events`] — detection event WAV/log persistence, the emergency alert
//!   log, and the rolling capture history.
//! * [`analyze`] — offline scoring of WAV files with the same engine.
//! * [`meter`] — console meter formatting.
//!
//! The detection core ([`crate::detect`]) performs no I/O; every side effect
//! of a verdict happens here.

pub mod analyze;
pub mod events;
pub mod meter;
pub mod monitor;
pub mod recorder;

pub use analyze::{analyze_file, AnalyzeError, FileReport};
pub use events::{CaptureHistory, DetectionEvent, EventError, EventLog, RecordingInfo};
pub use meter::meter_line;
pub use monitor::{CycleOutcome, MonitorSession};
pub use recorder::CycleRecorder;
