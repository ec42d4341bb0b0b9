//! Microphone input via `cpal`.
//!
//! The detection core is mono-only, so the stream callback collapses the
//! device's interleaved frames before anything crosses a thread: the channel
//! carries plain `Vec<f32>` mono batches and the rest of the crate never
//! sees a channel count.
//!
//! Capture runs at the device's native rate; the detection core is
//! rate-aware, so nothing in the pipeline resamples.

use std::sync::mpsc::Sender;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::audio::downmix_to_mono;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised while binding or starting the input stream.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no default input device available")]
    NoInputDevice,

    #[error("input device rejected the configuration query: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("could not open the capture stream: {0}")]
    OpenStream(#[from] cpal::BuildStreamError),

    #[error("could not start the capture stream: {0}")]
    StartStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// Keeps the hardware stream alive; dropping it stops capture.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// Microphone
// ---------------------------------------------------------------------------

/// The default input device, bound with its native stream configuration.
///
/// One `Microphone` feeds one monitoring session:
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use scream_watch::audio::Microphone;
///
/// let mic = Microphone::open()?;
/// let (tx, rx) = mpsc::channel();
/// let _stream = mic.start_stream(tx)?;
/// // rx now yields mono sample batches at mic.sample_rate().
/// # Ok::<(), scream_watch::audio::CaptureError>(())
/// ```
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl Microphone {
    /// Bind the system default input device at its preferred configuration.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoInputDevice`] when the host has no input device;
    /// [`CaptureError::Config`] when the device cannot report a default
    /// stream configuration.
    pub fn open() -> Result<Self, CaptureError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let supported = device.default_input_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();

        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
            channels,
        })
    }

    /// Start streaming mono sample batches to `tx`.
    ///
    /// Each hardware buffer is downmixed inside the cpal callback and
    /// forwarded as one batch.  A dropped receiver is ignored so the audio
    /// thread never panics.
    ///
    /// # Errors
    ///
    /// [`CaptureError::OpenStream`] / [`CaptureError::StartStream`] when the
    /// platform rejects the stream.
    pub fn start_stream(&self, tx: Sender<Vec<f32>>) -> Result<StreamHandle, CaptureError> {
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |frames: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(downmix_to_mono(frames, channels));
            },
            |err: cpal::StreamError| {
                log::error!("capture stream fault: {err}");
            },
            None,
        )?;
        stream.play()?;

        Ok(StreamHandle { _stream: stream })
    }

    /// Native sample rate of the device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the underlying device.  The stream itself always
    /// delivers mono.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_error_is_descriptive() {
        assert_eq!(
            CaptureError::NoInputDevice.to_string(),
            "no default input device available"
        );
    }
}
