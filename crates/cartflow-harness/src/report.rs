//! Winner selection, session summaries, and rule-based recommendations.

use cartflow_models::{
    ExecutionSpeed, Profile, ProfileAnalysis, SessionSummary, StealthLevel, TestReport,
    TestSession,
};

const SUCCESS_RATE_FLOOR: f64 = 0.7;
const SLOW_RUN_SECS: f64 = 120.0;

pub struct SessionReport;

impl SessionReport {
    /// Top-ranked analysis after a stable descending sort, or `None` on
    /// empty input. The winner carries `rank = 1` and its margin over the
    /// worst profile (0 when it was the only one).
    pub fn select_best(analyses: &[ProfileAnalysis]) -> Option<ProfileAnalysis> {
        if analyses.is_empty() {
            return None;
        }
        let mut ranked: Vec<&ProfileAnalysis> = analyses.iter().collect();
        ranked.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut best = ranked[0].clone();
        best.rank = Some(1);
        best.improvement_over_worst = Some(if ranked.len() > 1 {
            best.overall_score - ranked[ranked.len() - 1].overall_score
        } else {
            0.0
        });
        Some(best)
    }

    pub fn summarize(session: &TestSession) -> SessionSummary {
        SessionSummary {
            session_id: session.session_id.clone(),
            started_at: session.started_at,
            profiles_tested: session.profiles_tested.len(),
            total_iterations: session.results.iter().map(|r| r.iterations).sum(),
            best_profile: session
                .best_profile
                .as_ref()
                .map(|b| b.profile.name.clone()),
            best_score: session
                .best_profile
                .as_ref()
                .map(|b| b.overall_score)
                .unwrap_or(0.0),
        }
    }

    /// Rules evaluated in fixed order against the winner; each appends at
    /// most one message, independent of the others.
    pub fn recommendations(session: &TestSession) -> Vec<String> {
        if session.results.is_empty() {
            return vec!["No test results available for recommendations".to_string()];
        }
        let Some(best) = &session.best_profile else {
            return vec!["Unable to determine best profile".to_string()];
        };

        let mut recommendations = Vec::new();
        if best.profile.characteristics.speed == ExecutionSpeed::Slow {
            recommendations.push(
                "Slower execution shows better results - prioritize stealth over speed"
                    .to_string(),
            );
        }
        if best.profile.characteristics.stealth_level == StealthLevel::Maximum {
            recommendations
                .push("Maximum stealth settings are optimal for this target".to_string());
        }
        if best.success_rate < SUCCESS_RATE_FLOOR {
            recommendations
                .push("Consider additional warmup time or a different approach".to_string());
        }
        if best.avg_duration_secs > SLOW_RUN_SECS {
            recommendations.push(
                "Checkout is taking longer than expected - investigate bottlenecks".to_string(),
            );
        }
        recommendations
    }

    /// Full structured export of a finished session.
    pub fn export(session: &TestSession, profiles: &[Profile]) -> TestReport {
        TestReport {
            summary: Self::summarize(session),
            recommendations: Self::recommendations(session),
            profiles: profiles.to_vec(),
            session: session.clone(),
        }
    }
}
