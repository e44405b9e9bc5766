use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one execution of the checkout procedure under a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialOutcome {
    /// 1-based position within the profile's trial sequence.
    pub iteration: u32,
    pub success: bool,
    pub duration_secs: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrialOutcome {
    pub fn succeeded(iteration: u32, duration_secs: f64) -> Self {
        Self {
            iteration,
            success: true,
            duration_secs,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(iteration: u32, duration_secs: f64, error: impl Into<String>) -> Self {
        Self {
            iteration,
            success: false,
            duration_secs,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}
