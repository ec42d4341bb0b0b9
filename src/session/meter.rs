//! Console meter formatting.
//!
//! The monitor prints one meter line per score so an operator can watch the
//! two confidences move against the decision boundary:
//!
//! ```text
//! ML Confidence:    ████████░░░░░░░░░░░░ 0.42
//! Energy Level:     ██████████████░░░░░░ 0.71 !
//! ```

/// Number of segments in a meter bar.
const METER_WIDTH: usize = 20;

/// Render `value` (clamped to `[0, 1]`) as a fixed-width bar.
///
/// Values at or above `threshold` are suffixed with `!` so a breach is
/// visible even without terminal colors.
pub fn meter_line(value: f32, threshold: f32) -> String {
    let clamped = if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let filled = (clamped * METER_WIDTH as f32) as usize;
    let filled = filled.min(METER_WIDTH);

    let mut bar = String::with_capacity(METER_WIDTH + 8);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..METER_WIDTH {
        bar.push('░');
    }

    if clamped >= threshold {
        format!("{bar} {clamped:.2} !")
    } else {
        format!("{bar} {clamped:.2}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
