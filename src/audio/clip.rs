//! Audio clip type, the capped buffer that assembles one per cycle, and the
//! mono downmix shared by capture and file analysis.
//!
//! [`AudioClip`] is the unit of work handed to the detection core: a mono
//! `f32` buffer plus its sample rate.  [`ClipBuffer`] accumulates capture
//! batches for one monitoring cycle; when more samples arrive than fit, the
//! oldest are overwritten so the clip always holds the most recent audio.

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// A mono audio clip with its sample rate.
///
/// Samples are `f32` in `[-1.0, 1.0]`.  An empty clip is a valid degenerate
/// input — the detection core scores it as silence rather than failing.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Normalized mono PCM samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.  Zero is treated as invalid input downstream.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Create a clip from samples and a sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Clip duration in seconds.  Returns `0.0` when the sample rate is zero.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Peak absolute amplitude, `0.0` for an empty clip.
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// Returns `true` when the clip contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ClipBuffer
// ---------------------------------------------------------------------------

/// Fixed-capacity circular accumulator for one capture cycle.
///
/// When the buffer is full, new samples **overwrite** the oldest data so that
/// the most-recent `capacity` samples are always available — a stalled cycle
/// therefore yields the tail of the recording, not the head.
///
/// # Example
///
/// ```rust
/// use scream_watch::audio::ClipBuffer;
///
/// let mut buf = ClipBuffer::new(4, 44_100);
/// buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]); // 5 items → oldest dropped
/// let clip = buf.take_clip();
/// assert_eq!(clip.samples, vec![2.0, 3.0, 4.0, 5.0]);
/// ```
pub struct ClipBuffer {
    buf: Vec<f32>,
    capacity: usize,
    /// Index of the *next* write position (wraps around `capacity`).
    write_pos: usize,
    /// Number of valid samples currently stored (≤ `capacity`).
    len: usize,
    /// Sample rate stamped onto clips produced by [`take_clip`](Self::take_clip).
    sample_rate: u32,
}

impl ClipBuffer {
    /// Create a buffer sized for `capacity` samples at `sample_rate` Hz.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize, sample_rate: u32) -> Self {
        assert!(capacity > 0, "ClipBuffer capacity must be > 0");
        Self {
            buf: vec![0.0; capacity],
            capacity,
            write_pos: 0,
            len: 0,
            sample_rate,
        }
    }

    /// Create a buffer sized for `secs` seconds of mono audio at
    /// `sample_rate` Hz.
    pub fn for_duration(secs: f32, sample_rate: u32) -> Self {
        let capacity = ((secs * sample_rate as f32) as usize).max(1);
        Self::new(capacity, sample_rate)
    }

    /// Append `data`, overwriting the oldest samples on overflow.
    pub fn push_slice(&mut self, data: &[f32]) {
        for &sample in data {
            self.buf[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.capacity;
            if self.len < self.capacity {
                self.len += 1;
            }
        }
    }

    /// Drain all stored samples in chronological order into an [`AudioClip`]
    /// and reset the buffer.
    pub fn take_clip(&mut self) -> AudioClip {
        if self.len == 0 {
            return AudioClip::new(Vec::new(), self.sample_rate);
        }

        // When the buffer has never been fully filled, valid data starts at 0.
        // When it is full, the oldest sample sits at `write_pos`.
        let read_pos = if self.len < self.capacity {
            0
        } else {
            self.write_pos
        };

        let mut samples = Vec::with_capacity(self.len);
        for i in 0..self.len {
            samples.push(self.buf[(read_pos + i) % self.capacity]);
        }

        self.clear();
        AudioClip::new(samples, self.sample_rate)
    }

    /// Discard all samples and reset the write position.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Number of valid samples currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` when the buffer has been filled to capacity.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Maximum number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Collapse interleaved frames to mono by averaging each frame.
///
/// Mono input passes through unchanged; a trailing partial frame is
/// discarded; a channel count of zero yields no output.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels == 0 {
        return Vec::new();
    }
    if channels == 1 {
        return interleaved.to_vec();
    }

    let width = channels as usize;
    let mut mono = Vec::with_capacity(interleaved.len() / width);
    let mut start = 0;
    while start + width <= interleaved.len() {
        let frame = &interleaved[start..start + width];
        mono.push(frame.iter().sum::<f32>() / width as f32);
        start += width;
    }
    mono
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- AudioClip ----

    #[test]
    fn duration_of_three_seconds_at_44100() {
        let clip = AudioClip::new(vec![0.0; 44_100 * 3], 44_100);
        assert!((clip.duration_secs() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn duration_with_zero_rate_is_zero() {
        let clip = AudioClip::new(vec![0.0; 100], 0);
        assert_eq!(clip.duration_secs(), 0.0);
    }

    #[test]
    fn peak_of_empty_clip_is_zero() {
        let clip = AudioClip::new(Vec::new(), 44_100);
        assert_eq!(clip.peak(), 0.0);
        assert!(clip.is_empty());
    }

    #[test]
    fn peak_uses_absolute_amplitude() {
        let clip = AudioClip::new(vec![0.2, -0.9, 0.5], 44_100);
        assert!((clip.peak() - 0.9).abs() < 1e-6);
    }

    // ---- ClipBuffer push / take ----

    #[test]
    fn push_and_take_within_capacity() {
        let mut buf = ClipBuffer::new(8, 44_100);
        buf.push_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_full());

        let clip = buf.take_clip();
        assert_eq!(clip.samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(clip.sample_rate, 44_100);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = ClipBuffer::new(4, 44_100);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]); // 5 > capacity(4)

        assert_eq!(buf.len(), 4);
        let clip = buf.take_clip();
        assert_eq!(clip.samples, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn multiple_overflows_in_separate_calls() {
        let mut buf = ClipBuffer::new(3, 16_000);
        buf.push_slice(&[1.0, 2.0, 3.0]); // fill
        buf.push_slice(&[4.0, 5.0]); // overwrites 1 and 2

        let clip = buf.take_clip();
        assert_eq!(clip.samples, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn take_from_empty_yields_empty_clip() {
        let mut buf = ClipBuffer::new(4, 44_100);
        let clip = buf.take_clip();
        assert!(clip.is_empty());
        assert_eq!(clip.sample_rate, 44_100);
    }

    #[test]
    fn reuse_after_take() {
        let mut buf = ClipBuffer::new(3, 44_100);
        buf.push_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(buf.take_clip().samples, vec![1.0, 2.0, 3.0]);

        buf.push_slice(&[4.0, 5.0]);
        assert_eq!(buf.take_clip().samples, vec![4.0, 5.0]);
    }

    #[test]
    fn for_duration_sizes_capacity() {
        let buf = ClipBuffer::for_duration(3.0, 44_100);
        assert_eq!(buf.capacity(), 44_100 * 3);
    }

    #[test]
    #[should_panic(expected = "ClipBuffer capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = ClipBuffer::new(0, 44_100);
    }

    // ---- downmix_to_mono ----

    #[test]
    fn mono_downmix_is_passthrough() {
        let samples = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn stereo_downmix_averages_frames() {
        let interleaved = vec![1.0_f32, 0.0, 0.5, 0.5];
        assert_eq!(downmix_to_mono(&interleaved, 2), vec![0.5, 0.5]);
    }

    #[test]
    fn four_channel_downmix() {
        let interleaved = vec![1.0_f32, 0.0, 1.0, 0.0];
        assert_eq!(downmix_to_mono(&interleaved, 4), vec![0.5]);
    }

    #[test]
    fn zero_channel_downmix_is_empty() {
        assert!(downmix_to_mono(&[0.1, 0.2], 0).is_empty());
    }

    #[test]
    fn partial_trailing_frame_is_discarded() {
        // 5 samples, 2 channels: two full frames, last sample dropped.
        let interleaved = vec![1.0_f32, 1.0, 0.0, 0.0, 0.7];
        assert_eq!(downmix_to_mono(&interleaved, 2).len(), 2);
    }
}
