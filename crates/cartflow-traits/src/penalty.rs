use cartflow_models::{Profile, TrialOutcome};

/// Pluggable stealth-score penalty.
///
/// No detection-event producer ships today; the aggregator subtracts
/// whatever this returns and floors the result at zero, so a future
/// producer only needs to implement this trait.
pub trait DetectionPenalty: Send + Sync {
    fn penalty(&self, profile: &Profile, outcomes: &[TrialOutcome]) -> f64;
}

/// Default penalty: always zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDetectionPenalty;

impl DetectionPenalty for NoDetectionPenalty {
    fn penalty(&self, _profile: &Profile, _outcomes: &[TrialOutcome]) -> f64 {
        0.0
    }
}
