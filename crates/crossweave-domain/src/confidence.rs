//! Confidence arithmetic for nodes and relations
//!
//! All scores live in [0, 1]. Corroboration moves a score toward 1 by a
//! fraction of the remaining gap, so repeated observations are
//! diminishing-returns and the score stays strictly below 1. Decay is a
//! multiplicative step per unreinforced cycle.

/// Confidence assigned to a payload that carries no hint of its own
pub const DEFAULT_BASE_CONFIDENCE: f64 = 0.5;

/// Fraction of the remaining gap closed per corroborating observation
pub const CORROBORATION_GAIN: f64 = 0.25;

/// Multiplicative factor applied per unreinforced cycle during decay
pub const DECAY_FACTOR: f64 = 0.9;

/// Initial confidence for a payload's first observation
///
/// Uses the payload's own confidence hint when present, otherwise
/// [`DEFAULT_BASE_CONFIDENCE`]. Capped into [0, 1) so that a later
/// corroborating observation can never step the score down.
pub fn base_confidence(hint: Option<f64>) -> f64 {
    hint.unwrap_or(DEFAULT_BASE_CONFIDENCE)
        .clamp(0.0, 1.0)
        .min(1.0 - f64::EPSILON)
}

/// Merge a corroborating observation into an existing confidence score
///
/// The score moves toward 1 by [`CORROBORATION_GAIN`] of the remaining gap,
/// scaled by the observation's own confidence. Never decreases, never
/// reaches 1.
///
/// # Examples
///
/// ```
/// use crossweave_domain::confidence::combine;
///
/// let c1 = combine(0.5, 0.8);
/// let c2 = combine(c1, 0.8);
/// assert!(c1 > 0.5 && c2 > c1 && c2 < 1.0);
/// ```
pub fn combine(old: f64, observation: f64) -> f64 {
    let old = old.clamp(0.0, 1.0).min(1.0 - f64::EPSILON);
    let observation = observation.clamp(0.0, 1.0);
    let gap = 1.0 - old;
    (old + gap * CORROBORATION_GAIN * observation).min(1.0 - f64::EPSILON)
}

/// Apply one decay step to an unreinforced score
pub fn decay_step(confidence: f64, decay_factor: f64) -> f64 {
    (confidence * decay_factor.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Nudge a stored weight toward a newly computed one by a bounded step
///
/// A single noisy observation can move the weight by at most
/// `step * |target - current|`, which damps oscillation.
pub fn nudge(current: f64, target: f64, step: f64) -> f64 {
    let step = step.clamp(0.0, 1.0);
    (current + (target - current) * step).clamp(0.0, 1.0)
}
