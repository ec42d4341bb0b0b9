//! Feature extraction shared by both detectors.
//!
//! [`FeatureExtractor`] converts an [`AudioClip`] into a fixed-order
//! [`FeatureVector`]:
//!
//! | # | Feature  | Domain    | What it separates                          |
//! |---|----------|-----------|--------------------------------------------|
//! | 0 | energy   | time      | loud events vs. ambience (`mean(x²)`)      |
//! | 1 | peak     | time      | transient level (`max(|x|)`)               |
//! | 2 | zcr      | time      | noisy/broadband vs. tonal content          |
//! | 3 | centroid | frequency | scream brightness vs. low-pitched speech   |
//! | 4 | rolloff  | frequency | broadband energy spread (85 % point)       |
//! | 5 | flatness | frequency | noise-like vs. harmonic spectra            |
//!
//! The spectral features are computed from a 1024-point Hann-windowed FFT of
//! the window surrounding the clip's peak sample, so a short scream inside a
//! longer quiet clip still dominates the spectrum.
//!
//! Degenerate input (empty clip, zero sample rate) yields the all-zero
//! vector; every output is finite for every valid input.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::AudioClip;

/// FFT window size for spectral feature extraction.
pub const FFT_SIZE: usize = 1024;

/// Number of scalars in a [`FeatureVector`], in the fixed extraction order.
pub const FEATURE_COUNT: usize = 6;

/// Spectral rolloff threshold (85 % of spectral energy).
const ROLLOFF_THRESHOLD: f32 = 0.85;

// ---------------------------------------------------------------------------
// FeatureVector
// ---------------------------------------------------------------------------

/// Fixed-order feature set consumed by both detectors.
///
/// The extraction order never changes — the trained model's weights are bound
/// to it via [`FeatureVector::as_array`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Mean-square energy, `mean(x²)`, in `[0, 1]` for normalized input.
    pub energy: f32,
    /// Peak absolute amplitude, `max(|x|)`.
    pub peak: f32,
    /// Zero-crossing rate, normalized to `[0, 1]`.
    pub zcr: f32,
    /// Spectral centroid in Hz (weighted mean frequency).
    pub centroid: f32,
    /// Spectral rolloff in Hz (85 % energy point).
    pub rolloff: f32,
    /// Spectral flatness in `[0, 1]` (geometric / arithmetic mean ratio).
    pub flatness: f32,
}

impl FeatureVector {
    /// The all-zero vector used for degenerate input.
    pub fn zero() -> Self {
        Self {
            energy: 0.0,
            peak: 0.0,
            zcr: 0.0,
            centroid: 0.0,
            rolloff: 0.0,
            flatness: 0.0,
        }
    }

    /// Features in the fixed extraction order:
    /// `[energy, peak, zcr, centroid, rolloff, flatness]`.
    pub fn as_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.energy,
            self.peak,
            self.zcr,
            self.centroid,
            self.rolloff,
            self.flatness,
        ]
    }

    /// Returns `true` when every feature is finite (no NaN / Inf).
    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// FeatureExtractor
// ---------------------------------------------------------------------------

/// Stateless feature extraction pipeline.
///
/// Construction plans the FFT once; [`extract`](Self::extract) is then pure
/// computation with no side effects and may be called from any thread.
pub struct FeatureExtractor {
    fft: Arc<dyn Fft<f32>>,
    /// Pre-computed Hann window, length [`FFT_SIZE`].
    window: Vec<f32>,
}

impl FeatureExtractor {
    /// Create a new extractor with a planned 1024-point forward FFT.
    pub fn new() -> Self {
        // Hann window to reduce spectral leakage.
        let window = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (FFT_SIZE as f32 - 1.0)).cos())
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);

        Self { fft, window }
    }

    /// Extract the full [`FeatureVector`] from `clip`.
    ///
    /// An empty clip or a zero sample rate yields [`FeatureVector::zero`];
    /// this never panics and never produces NaN / Inf.
    pub fn extract(&self, clip: &AudioClip) -> FeatureVector {
        if clip.is_empty() || clip.sample_rate == 0 {
            return FeatureVector::zero();
        }

        let samples = &clip.samples;

        // Time-domain features over the whole clip.
        let energy = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
        let peak = clip.peak();
        let zcr = compute_zcr(samples);

        // Spectral features from the window around the loudest sample.
        let spectrum = self.compute_magnitude_spectrum(peak_window(samples));
        let centroid = compute_centroid(&spectrum, clip.sample_rate);
        let rolloff = compute_rolloff(&spectrum, clip.sample_rate);
        let flatness = compute_flatness(&spectrum);

        let features = FeatureVector {
            energy,
            peak,
            zcr,
            centroid,
            rolloff,
            flatness,
        };

        // Numeric faults (e.g. Inf samples) must not propagate downstream.
        if features.is_finite() {
            features
        } else {
            log::warn!("feature extraction produced non-finite values; using zero vector");
            FeatureVector::zero()
        }
    }

    /// Hann-windowed magnitude spectrum of up to [`FFT_SIZE`] samples
    /// (zero-padded when shorter).  Returns positive frequencies only
    /// (`FFT_SIZE / 2 + 1` bins).
    fn compute_magnitude_spectrum(&self, audio: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = Vec::with_capacity(FFT_SIZE);

        for (i, &sample) in audio.iter().take(FFT_SIZE).enumerate() {
            buffer.push(Complex::new(sample * self.window[i], 0.0));
        }
        while buffer.len() < FFT_SIZE {
            buffer.push(Complex::new(0.0, 0.0));
        }

        self.fft.process(&mut buffer);

        buffer[..FFT_SIZE / 2 + 1].iter().map(|c| c.norm()).collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Feature computations
// ---------------------------------------------------------------------------

/// The [`FFT_SIZE`]-sample window containing the loudest sample, clamped to
/// the clip bounds.
fn peak_window(samples: &[f32]) -> &[f32] {
    if samples.len() <= FFT_SIZE {
        return samples;
    }

    let peak_idx = samples
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.abs()
                .partial_cmp(&b.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let start = peak_idx
        .saturating_sub(FFT_SIZE / 2)
        .min(samples.len() - FFT_SIZE);
    &samples[start..start + FFT_SIZE]
}

/// Zero-crossing rate, normalized to `[0, 1]`.
fn compute_zcr(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }

    let mut crossings = 0;
    for i in 1..samples.len() {
        if (samples[i] >= 0.0 && samples[i - 1] < 0.0)
            || (samples[i] < 0.0 && samples[i - 1] >= 0.0)
        {
            crossings += 1;
        }
    }

    crossings as f32 / (samples.len() - 1) as f32
}

/// Spectral centroid in Hz: `Σ(f_i × |X[i]|) / Σ|X[i]|`.
fn compute_centroid(spectrum: &[f32], sample_rate: u32) -> f32 {
    let freq_bin_width = sample_rate as f32 / FFT_SIZE as f32;

    let weighted_sum: f32 = spectrum
        .iter()
        .enumerate()
        .map(|(i, &mag)| i as f32 * freq_bin_width * mag)
        .sum();

    let magnitude_sum: f32 = spectrum.iter().sum();

    if magnitude_sum > 1e-10 {
        weighted_sum / magnitude_sum
    } else {
        0.0
    }
}

/// Spectral rolloff in Hz: the frequency below which 85 % of the spectral
/// energy is contained.
fn compute_rolloff(spectrum: &[f32], sample_rate: u32) -> f32 {
    let total_energy: f32 = spectrum.iter().map(|&mag| mag * mag).sum();

    if total_energy < 1e-10 {
        return 0.0;
    }

    let threshold = ROLLOFF_THRESHOLD * total_energy;
    let freq_bin_width = sample_rate as f32 / FFT_SIZE as f32;

    let mut cumulative = 0.0;
    for (i, &mag) in spectrum.iter().enumerate() {
        cumulative += mag * mag;
        if cumulative >= threshold {
            return i as f32 * freq_bin_width;
        }
    }

    (spectrum.len() - 1) as f32 * freq_bin_width
}

/// Spectral flatness: `geometric_mean / arithmetic_mean` of the magnitudes,
/// in `[0, 1]` — 0 for a pure tone, →1 for white noise.
fn compute_flatness(spectrum: &[f32]) -> f32 {
    let non_zero: Vec<f32> = spectrum
        .iter()
        .filter(|&&mag| mag > 1e-10)
        .copied()
        .collect();

    if non_zero.is_empty() {
        return 0.0;
    }

    let log_sum: f32 = non_zero.iter().map(|&mag| mag.ln()).sum();
    let geometric_mean = (log_sum / non_zero.len() as f32).exp();
    let arithmetic_mean: f32 = non_zero.iter().sum::<f32>() / non_zero.len() as f32;

    if arithmetic_mean > 1e-10 {
        (geometric_mean / arithmetic_mean).min(1.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
