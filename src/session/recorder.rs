//! Per-cycle recording from a live capture channel.
//!
//! [`CycleRecorder`] sits between the capture callback thread and the monitor
//! loop: it drains mono sample batches off the mpsc channel for one cycle's
//! duration and assembles one [`AudioClip`].
//!
//! The recorder owns only the receiving end of the channel — the
//! [`crate::audio::StreamHandle`] that keeps the hardware stream alive stays
//! with the caller.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::audio::{AudioClip, ClipBuffer};

/// How long to wait for the next batch before checking the cycle deadline.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Assembles one [`AudioClip`] per monitoring cycle from a capture channel.
pub struct CycleRecorder {
    rx: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl CycleRecorder {
    /// Create a recorder for a channel fed by
    /// [`crate::audio::Microphone::start_stream`].
    ///
    /// `sample_rate` must be the capture device's native rate; it sizes the
    /// per-cycle buffer and is stamped onto every produced clip.
    pub fn new(rx: Receiver<Vec<f32>>, sample_rate: u32) -> Self {
        Self { rx, sample_rate }
    }

    /// Record for `secs` seconds and return the assembled clip.
    ///
    /// Blocks until the cycle deadline passes or the sending side of the
    /// channel disconnects (capture stream dropped).  Batches still queued
    /// from before the call are consumed too, so the clip always reflects
    /// the most recent audio.  A device that delivers nothing yields an
    /// empty clip, which the detection core scores as silence.
    pub fn record_cycle(&self, secs: f32) -> AudioClip {
        let mut buffer = ClipBuffer::for_duration(secs.max(0.0), self.sample_rate);
        let deadline = Instant::now() + Duration::from_secs_f32(secs.max(0.0));

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = RECV_TIMEOUT.min(deadline - now);

            match self.rx.recv_timeout(wait) {
                Ok(batch) => buffer.push_slice(&batch),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("capture channel disconnected mid-cycle");
                    break;
                }
            }
        }

        buffer.take_clip()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn collects_batches_sent_before_recording() {
        let (tx, rx) = mpsc::channel();
        tx.send(vec![0.1, 0.2]).unwrap();
        tx.send(vec![0.3]).unwrap();
        drop(tx); // disconnect ends the cycle early

        let recorder = CycleRecorder::new(rx, 44_100);
        let clip = recorder.record_cycle(1.0);

        assert_eq!(clip.samples, vec![0.1, 0.2, 0.3]);
        assert_eq!(clip.sample_rate, 44_100);
    }

    #[test]
    fn empty_channel_yields_empty_clip() {
        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        drop(tx);

        let recorder = CycleRecorder::new(rx, 44_100);
        let clip = recorder.record_cycle(0.2);

        assert!(clip.is_empty());
        assert_eq!(clip.sample_rate, 44_100);
    }

    #[test]
    fn batches_arriving_during_cycle_are_collected() {
        let (tx, rx) = mpsc::channel();

        let sender = thread::spawn(move || {
            for _ in 0..3 {
                tx.send(vec![0.25; 4]).unwrap();
                thread::sleep(Duration::from_millis(20));
            }
            // tx dropped here ends the cycle
        });

        let recorder = CycleRecorder::new(rx, 44_100);
        let clip = recorder.record_cycle(2.0);
        sender.join().unwrap();

        assert_eq!(clip.samples.len(), 12);
    }

    #[test]
    fn clip_capped_to_cycle_capacity_keeps_latest() {
        let (tx, rx) = mpsc::channel();
        // 1 second at 10 Hz rate → capacity 10; send 15 samples.
        for i in 0..15 {
            tx.send(vec![i as f32]).unwrap();
        }
        drop(tx);

        let recorder = CycleRecorder::new(rx, 10);
        let clip = recorder.record_cycle(1.0);

        assert_eq!(clip.samples.len(), 10);
        assert_eq!(clip.samples[0], 5.0);
        assert_eq!(clip.samples[9], 14.0);
    }
}
