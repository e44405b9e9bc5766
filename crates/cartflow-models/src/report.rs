use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::session::TestSession;

/// Compact view of a finished session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub profiles_tested: usize,
    pub total_iterations: usize,
    pub best_profile: Option<String>,
    pub best_score: f64,
}

/// Full structured export of a scoring run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestReport {
    pub session: TestSession,
    pub profiles: Vec<Profile>,
    pub summary: SessionSummary,
    pub recommendations: Vec<String>,
}
