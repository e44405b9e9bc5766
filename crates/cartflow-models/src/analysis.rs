use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::trial::TrialOutcome;

/// Aggregate over a profile's trial outcome sequence.
///
/// Derived deterministically once the sequence is finalized; `rank` and
/// `improvement_over_worst` are attached to the winning analysis only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileAnalysis {
    pub profile: Profile,
    pub success_rate: f64,
    pub avg_duration_secs: f64,
    pub error_rate: f64,
    pub speed_score: f64,
    pub stealth_score: f64,
    pub overall_score: f64,
    pub iterations: usize,
    pub successful_iterations: usize,
    pub outcomes: Vec<TrialOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_over_worst: Option<f64>,
}

impl ProfileAnalysis {
    /// Zero-valued analysis for an empty outcome sequence.
    pub fn zeroed(profile: Profile) -> Self {
        Self {
            profile,
            success_rate: 0.0,
            avg_duration_secs: 0.0,
            error_rate: 1.0,
            speed_score: 0.0,
            stealth_score: 0.0,
            overall_score: 0.0,
            iterations: 0,
            successful_iterations: 0,
            outcomes: Vec::new(),
            rank: None,
            improvement_over_worst: None,
        }
    }
}
