//! Weighted scoring of trial outcome sequences.

use cartflow_models::{Profile, ProfileAnalysis, TrialOutcome};
use cartflow_traits::{DetectionPenalty, NoDetectionPenalty};

/// Fixed score weights. Not configurable per call.
const SUCCESS_WEIGHT: f64 = 0.5;
const SPEED_WEIGHT: f64 = 0.3;
const STEALTH_WEIGHT: f64 = 0.2;

/// Runs at or beyond this average duration score zero on speed.
const SPEED_SATURATION_SECS: f64 = 60.0;

/// Reduces a profile's trial outcomes to a single weighted score.
pub struct ScoreAggregator {
    penalty: Box<dyn DetectionPenalty>,
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self {
            penalty: Box::new(NoDetectionPenalty),
        }
    }

    pub fn with_penalty(penalty: Box<dyn DetectionPenalty>) -> Self {
        Self { penalty }
    }

    /// Aggregate an outcome sequence. Total over empty input: a zeroed
    /// analysis, never a division by zero.
    pub fn analyze(&self, profile: &Profile, outcomes: &[TrialOutcome]) -> ProfileAnalysis {
        if outcomes.is_empty() {
            return ProfileAnalysis::zeroed(profile.clone());
        }

        let total = outcomes.len();
        let successful = outcomes.iter().filter(|o| o.success).count();
        let success_rate = successful as f64 / total as f64;
        let avg_duration_secs =
            outcomes.iter().map(|o| o.duration_secs).sum::<f64>() / total as f64;

        let speed_score = (1.0 - avg_duration_secs / SPEED_SATURATION_SECS).max(0.0);
        let base = profile.characteristics.stealth_level.base_score();
        let stealth_score = (base - self.penalty.penalty(profile, outcomes)).max(0.0);

        let overall_score = SUCCESS_WEIGHT * success_rate
            + SPEED_WEIGHT * speed_score
            + STEALTH_WEIGHT * stealth_score;

        ProfileAnalysis {
            profile: profile.clone(),
            success_rate,
            avg_duration_secs,
            error_rate: 1.0 - success_rate,
            speed_score,
            stealth_score,
            overall_score,
            iterations: total,
            successful_iterations: successful,
            outcomes: outcomes.to_vec(),
            rank: None,
            improvement_over_worst: None,
        }
    }

    /// Stable descending sort by overall score; ties keep input order.
    pub fn rank(&self, mut analyses: Vec<ProfileAnalysis>) -> Vec<ProfileAnalysis> {
        analyses.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        analyses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartflow_memory::EventStore;
    use cartflow_models::{StealthLevel, TrialOutcome};

    fn profiles() -> Vec<Profile> {
        crate::catalog::ProfileCatalog::generate(3, &EventStore::in_memory()).unwrap()
    }

    fn outcome(iteration: u32, success: bool, duration_secs: f64) -> TrialOutcome {
        if success {
            TrialOutcome::succeeded(iteration, duration_secs)
        } else {
            TrialOutcome::failed(iteration, duration_secs, "declined")
        }
    }

    #[test]
    fn empty_outcomes_yield_zeroed_analysis() {
        let aggregator = ScoreAggregator::new();
        for profile in profiles() {
            let analysis = aggregator.analyze(&profile, &[]);
            assert_eq!(analysis.success_rate, 0.0);
            assert_eq!(analysis.overall_score, 0.0);
            assert_eq!(analysis.iterations, 0);
            assert_eq!(analysis.error_rate, 1.0);
        }
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let aggregator = ScoreAggregator::new();
        let profile = &profiles()[0];
        let sequences: Vec<Vec<TrialOutcome>> = vec![
            vec![outcome(1, true, 0.0)],
            vec![outcome(1, false, 500.0), outcome(2, true, 0.5)],
            (1..=10).map(|i| outcome(i, i % 3 == 0, i as f64 * 30.0)).collect(),
        ];

        for outcomes in sequences {
            let a = aggregator.analyze(profile, &outcomes);
            assert!((0.0..=1.0).contains(&a.success_rate));
            assert!((0.0..=1.0).contains(&a.speed_score));
            assert!((0.0..=1.0).contains(&a.stealth_score));
            assert!((0.0..=1.0).contains(&a.overall_score));
        }
    }

    #[test]
    fn fixing_one_failure_never_lowers_the_score() {
        let aggregator = ScoreAggregator::new();
        let profile = &profiles()[1];

        let mut outcomes = vec![
            outcome(1, true, 10.0),
            outcome(2, false, 10.0),
            outcome(3, false, 10.0),
        ];
        let before = aggregator.analyze(profile, &outcomes);

        outcomes[1].success = true;
        outcomes[1].error = None;
        let after = aggregator.analyze(profile, &outcomes);

        assert!(after.success_rate >= before.success_rate);
        assert!(after.overall_score >= before.overall_score);
    }

    #[test]
    fn ten_second_average_scores_as_expected() {
        let aggregator = ScoreAggregator::new();
        let conservative = &profiles()[0];
        assert_eq!(
            conservative.characteristics.stealth_level,
            StealthLevel::Maximum
        );

        let analysis = aggregator.analyze(conservative, &[outcome(1, true, 10.0)]);
        assert!((analysis.success_rate - 1.0).abs() < 1e-9);
        assert!((analysis.speed_score - (1.0 - 10.0 / 60.0)).abs() < 1e-9);
        assert!((analysis.stealth_score - 1.0).abs() < 1e-9);
        let expected = 0.5 * 1.0 + 0.3 * (1.0 - 10.0 / 60.0) + 0.2 * 1.0;
        assert!((analysis.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn speed_score_saturates_beyond_a_minute() {
        let aggregator = ScoreAggregator::new();
        let profile = &profiles()[2];
        let analysis = aggregator.analyze(profile, &[outcome(1, true, 300.0)]);
        assert_eq!(analysis.speed_score, 0.0);
    }

    #[test]
    fn ranking_follows_stealth_when_everything_else_ties() {
        let aggregator = ScoreAggregator::new();
        let analyses: Vec<ProfileAnalysis> = profiles()
            .iter()
            .map(|p| aggregator.analyze(p, &[outcome(1, true, 10.0)]))
            .collect();

        let ranked = aggregator.rank(analyses);
        let names: Vec<&str> = ranked.iter().map(|a| a.profile.name.as_str()).collect();
        assert_eq!(names, vec!["Conservative", "Balanced", "Aggressive"]);
    }

    #[test]
    fn failed_trials_count_with_their_recorded_duration() {
        let aggregator = ScoreAggregator::new();
        let profile = &profiles()[1];
        let analysis = aggregator.analyze(
            profile,
            &[outcome(1, true, 30.0), outcome(2, false, 0.0)],
        );
        assert!((analysis.avg_duration_secs - 15.0).abs() < 1e-9);
        assert_eq!(analysis.successful_iterations, 1);
        assert_eq!(analysis.iterations, 2);
    }
}
