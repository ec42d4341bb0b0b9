//! Decision fusion and cooldown.
//!
//! [`DecisionPolicy`] turns the two per-detector [`DetectionResult`]s into a
//! single [`FusedVerdict`].  Detection fires only when **both** detectors are
//! positive — a precision-over-recall choice that suppresses either
//! detector's individual noise sensitivity.
//!
//! A per-instance cooldown (default 5 s) marks repeated positives within the
//! window as not *actionable*: the scores are still computed and returned,
//! but the caller must not trigger side effects (alert, persistence) for
//! them.  The cooldown timestamp lives in the policy instance and is reset
//! with the session.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DetectionResult
// ---------------------------------------------------------------------------

/// One detector's classification of a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    /// Whether this detector classifies the clip as a scream.
    pub is_scream: bool,
    /// The detector's confidence in `[0, 1]` — raw energy for the heuristic
    /// detector, model confidence for the classifier.
    pub confidence: f32,
}

impl DetectionResult {
    /// Convenience constructor.
    pub fn new(is_scream: bool, confidence: f32) -> Self {
        Self {
            is_scream,
            confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// FusedVerdict
// ---------------------------------------------------------------------------

/// The core's single output per detection cycle.
///
/// Both scalar confidences are always carried for diagnostic display,
/// regardless of the boolean outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedVerdict {
    /// `true` when both detectors independently classified positive.
    pub detected: bool,
    /// Classifier confidence in `[0, 1]`.
    pub ml_confidence: f32,
    /// Heuristic mean-square energy in `[0, 1]`.
    pub energy_level: f32,
    /// `detected` gated by the cooldown: `true` only when side effects
    /// (alert, persistence) should fire for this cycle.
    pub actionable: bool,
}

// ---------------------------------------------------------------------------
// DecisionPolicy
// ---------------------------------------------------------------------------

/// AND-fusion with per-session cooldown state.
///
/// # Example
///
/// ```rust
/// use scream_watch::detect::{DecisionPolicy, DetectionResult};
/// use std::time::Duration;
///
/// let mut policy = DecisionPolicy::new(Duration::from_secs(5));
///
/// let verdict = policy.fuse(
///     DetectionResult::new(true, 0.7),
///     DetectionResult::new(true, 0.9),
/// );
/// assert!(verdict.detected);
/// assert!(verdict.actionable);
///
/// // A second positive inside the window is detected but not actionable.
/// let again = policy.fuse(
///     DetectionResult::new(true, 0.7),
///     DetectionResult::new(true, 0.9),
/// );
/// assert!(again.detected);
/// assert!(!again.actionable);
/// ```
pub struct DecisionPolicy {
    cooldown: Duration,
    /// Instant of the last actionable positive verdict, if any.
    last_actionable: Option<Instant>,
}

impl DecisionPolicy {
    /// Create a policy with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_actionable: None,
        }
    }

    /// Cooldown window currently in use.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Fuse the two detector results at the current instant.
    pub fn fuse(&mut self, heuristic: DetectionResult, model: DetectionResult) -> FusedVerdict {
        self.fuse_at(Instant::now(), heuristic, model)
    }

    /// Fuse with an explicit `now` — the deterministic entry point used by
    /// tests and replay tooling.
    ///
    /// The cooldown timestamp advances only on an actionable positive, so a
    /// stream of suppressed positives cannot push the window forward.
    pub fn fuse_at(
        &mut self,
        now: Instant,
        heuristic: DetectionResult,
        model: DetectionResult,
    ) -> FusedVerdict {
        let detected = heuristic.is_scream && model.is_scream;

        let actionable = detected
            && match self.last_actionable {
                None => true,
                Some(last) => now.duration_since(last) >= self.cooldown,
            };

        if actionable {
            self.last_actionable = Some(now);
        }

        FusedVerdict {
            detected,
            ml_confidence: model.confidence,
            energy_level: heuristic.confidence,
            actionable,
        }
    }

    /// Clear the cooldown state, e.g. when a new session starts.
    pub fn reset(&mut self) {
        self.last_actionable = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn positive(confidence: f32) -> DetectionResult {
        DetectionResult::new(true, confidence)
    }

    fn negative(confidence: f32) -> DetectionResult {
        DetectionResult::new(false, confidence)
    }

    // ---- truth table ----

    #[test]
    fn fuse_truth_table() {
        // (heuristic, model) → detected; exhaustive over the 4 combinations.
        let cases = [
            (negative(0.1), negative(0.2), false),
            (positive(0.6), negative(0.2), false),
            (negative(0.1), positive(0.9), false),
            (positive(0.6), positive(0.9), true),
        ];

        for (heuristic, model, expected) in cases {
            let mut policy = DecisionPolicy::new(Duration::from_secs(5));
            let verdict = policy.fuse(heuristic, model);
            assert_eq!(
                verdict.detected, expected,
                "heuristic = {heuristic:?}, model = {model:?}"
            );
        }
    }

    #[test]
    fn scores_carried_regardless_of_outcome() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let verdict = policy.fuse(negative(0.33), positive(0.81));
        assert!(!verdict.detected);
        assert!((verdict.energy_level - 0.33).abs() < 1e-6);
        assert!((verdict.ml_confidence - 0.81).abs() < 1e-6);
    }

    // ---- cooldown ----

    #[test]
    fn second_positive_inside_window_is_not_actionable() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        let first = policy.fuse_at(t0, positive(0.6), positive(0.9));
        assert!(first.actionable);

        let second = policy.fuse_at(t0 + Duration::from_secs(2), positive(0.6), positive(0.9));
        assert!(second.detected);
        assert!(!second.actionable);
    }

    #[test]
    fn positive_after_window_is_actionable_again() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(policy.fuse_at(t0, positive(0.6), positive(0.9)).actionable);
        assert!(
            !policy
                .fuse_at(t0 + Duration::from_secs(2), positive(0.6), positive(0.9))
                .actionable
        );
        assert!(
            policy
                .fuse_at(t0 + Duration::from_secs(6), positive(0.6), positive(0.9))
                .actionable
        );
    }

    #[test]
    fn suppressed_positives_do_not_extend_the_window() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(policy.fuse_at(t0, positive(0.6), positive(0.9)).actionable);
        // A suppressed positive at t0+4 must not push re-arm to t0+9.
        assert!(
            !policy
                .fuse_at(t0 + Duration::from_secs(4), positive(0.6), positive(0.9))
                .actionable
        );
        assert!(
            policy
                .fuse_at(t0 + Duration::from_secs(5), positive(0.6), positive(0.9))
                .actionable
        );
    }

    #[test]
    fn negatives_never_consume_the_cooldown() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        let verdict = policy.fuse_at(t0, negative(0.1), positive(0.9));
        assert!(!verdict.actionable);

        // First actual positive is still actionable immediately.
        assert!(
            policy
                .fuse_at(t0 + Duration::from_millis(1), positive(0.6), positive(0.9))
                .actionable
        );
    }

    #[test]
    fn reset_re_arms_immediately() {
        let mut policy = DecisionPolicy::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert!(policy.fuse_at(t0, positive(0.6), positive(0.9)).actionable);
        policy.reset();
        assert!(
            policy
                .fuse_at(t0 + Duration::from_secs(1), positive(0.6), positive(0.9))
                .actionable
        );
    }
}
