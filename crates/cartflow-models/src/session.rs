//! Test session lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::ProfileAnalysis;
use crate::error::ModelError;

/// Session lifecycle state. There is no transition out of `Finalized`;
/// a new run requires a new session id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Running,
    Finalized,
}

/// One complete run of the harness across all profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub profiles_tested: Vec<String>,
    pub results: Vec<ProfileAnalysis>,
    pub best_profile: Option<ProfileAnalysis>,
    pub state: SessionState,
}

impl TestSession {
    pub fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            session_id: format!("AB_{}", &token[..8]),
            started_at: Utc::now(),
            profiles_tested: Vec::new(),
            results: Vec::new(),
            best_profile: None,
            state: SessionState::Created,
        }
    }

    /// Append a completed profile analysis. Moves the session to `Running`.
    pub fn record(&mut self, analysis: ProfileAnalysis) -> Result<(), ModelError> {
        if self.state == SessionState::Finalized {
            return Err(ModelError::SessionFinalized {
                session_id: self.session_id.clone(),
            });
        }
        self.state = SessionState::Running;
        self.profiles_tested.push(analysis.profile.name.clone());
        self.results.push(analysis);
        Ok(())
    }

    /// Seal the session with the selected winner.
    pub fn finalize(&mut self, best: Option<ProfileAnalysis>) -> Result<(), ModelError> {
        if self.state == SessionState::Finalized {
            return Err(ModelError::SessionFinalized {
                session_id: self.session_id.clone(),
            });
        }
        self.best_profile = best;
        self.state = SessionState::Finalized;
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.state == SessionState::Finalized
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        BehaviorPlan, Characteristics, ClickPrecision, ErrorHandling, ErrorRecovery,
        ExecutionSpeed, FormFilling, HumanSimulation, MousePace, Profile, RiskTolerance,
        ScrollPattern, StealthLevel, TimingPlan, TimingRange,
    };

    fn analysis(name: &str) -> ProfileAnalysis {
        let profile = Profile::new(
            name.to_lowercase(),
            name,
            Characteristics {
                speed: ExecutionSpeed::Medium,
                stealth_level: StealthLevel::High,
                risk_tolerance: RiskTolerance::Medium,
                human_simulation: HumanSimulation::Medium,
                delay_multiplier: 1.5,
                error_recovery: ErrorRecovery::Adaptive,
            },
            TimingPlan {
                page_load_wait: TimingRange::new(3.0, 7.0),
                action_delay: TimingRange::new(1.0, 3.0),
                typing_delay: TimingRange::new(0.05, 0.2),
                mouse_pace: MousePace::Medium,
            },
            BehaviorPlan {
                scroll_pattern: ScrollPattern::Varied,
                click_precision: ClickPrecision::Accurate,
                form_filling: FormFilling::Steady,
                error_handling: ErrorHandling::SmartRetry,
            },
        )
        .unwrap();
        ProfileAnalysis::zeroed(profile)
    }

    #[test]
    fn session_ids_are_prefixed_and_unique() {
        let a = TestSession::new();
        let b = TestSession::new();
        assert!(a.session_id.starts_with("AB_"));
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn record_moves_created_to_running() {
        let mut session = TestSession::new();
        assert_eq!(session.state, SessionState::Created);
        session.record(analysis("Balanced")).unwrap();
        assert_eq!(session.state, SessionState::Running);
        assert_eq!(session.profiles_tested, vec!["Balanced".to_string()]);
    }

    #[test]
    fn no_transition_out_of_finalized() {
        let mut session = TestSession::new();
        session.record(analysis("Balanced")).unwrap();
        session.finalize(None).unwrap();
        assert!(session.is_finalized());

        assert!(session.record(analysis("Aggressive")).is_err());
        assert!(session.finalize(None).is_err());
        assert_eq!(session.results.len(), 1);
    }
}
