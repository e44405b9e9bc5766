use serde::{Deserialize, Serialize};

use crate::event::EventSample;

/// Bound on the per-pattern error history.
pub const RECENT_ERRORS_CAP: usize = 20;

/// Running aggregates for one event kind.
///
/// `success_rate` and `avg_duration` are incrementally updated, never
/// recomputed from history: `new = (old * (count - 1) + value) / count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternStats {
    pub count: u64,
    pub success_rate: f64,
    pub avg_duration: f64,
    #[serde(default)]
    pub recent_errors: Vec<String>,
}

impl PatternStats {
    /// Fold one observation into the aggregates.
    pub fn observe(&mut self, sample: &EventSample) {
        self.count += 1;
        let n = self.count as f64;

        if let Some(success) = sample.success {
            let value = if success { 1.0 } else { 0.0 };
            self.success_rate = (self.success_rate * (n - 1.0) + value) / n;
            if !success
                && let Some(error) = &sample.error
            {
                self.recent_errors.push(error.clone());
                if self.recent_errors.len() > RECENT_ERRORS_CAP {
                    self.recent_errors.remove(0);
                }
            }
        }

        if let Some(duration) = sample.duration_secs {
            self.avg_duration = (self.avg_duration * (n - 1.0) + duration) / n;
        }
    }

    /// Optimization hints derived from the aggregates.
    pub fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if self.success_rate < 0.5 {
            hints.push(format!(
                "Low success rate ({:.1}%) - consider strategy adjustment",
                self.success_rate * 100.0
            ));
        }
        if self.avg_duration > 30.0 {
            hints.push(format!(
                "High average duration ({:.1}s) - optimize timing",
                self.avg_duration
            ));
        }
        if let Some(most_common) = self.most_common_error() {
            hints.push(format!("Most common error: {most_common}"));
        }
        hints
    }

    fn most_common_error(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for error in &self.recent_errors {
            let occurrences = self
                .recent_errors
                .iter()
                .filter(|other| *other == error)
                .count();
            match best {
                Some((_, count)) if count >= occurrences => {}
                _ => best = Some((error, occurrences)),
            }
        }
        best.map(|(error, _)| error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_success_rate_matches_exact_average() {
        let mut stats = PatternStats::default();
        let samples = [true, false, true, true, false, true, true, true];
        for &success in &samples {
            let sample = if success {
                EventSample::success(1.0)
            } else {
                EventSample::failure(1.0, "boom")
            };
            stats.observe(&sample);
        }

        let exact = samples.iter().filter(|&&s| s).count() as f64 / samples.len() as f64;
        assert!((stats.success_rate - exact).abs() < 1e-9);
        assert_eq!(stats.count, samples.len() as u64);
    }

    #[test]
    fn running_duration_matches_exact_mean() {
        let mut stats = PatternStats::default();
        let durations = [10.0, 20.0, 30.0, 5.0];
        for &d in &durations {
            stats.observe(&EventSample::success(d));
        }
        let exact: f64 = durations.iter().sum::<f64>() / durations.len() as f64;
        assert!((stats.avg_duration - exact).abs() < 1e-9);
    }

    #[test]
    fn error_history_is_bounded() {
        let mut stats = PatternStats::default();
        for i in 0..(RECENT_ERRORS_CAP + 15) {
            stats.observe(&EventSample::failure(0.0, format!("err-{i}")));
        }
        assert_eq!(stats.recent_errors.len(), RECENT_ERRORS_CAP);
        // Oldest entries are dropped first.
        assert_eq!(stats.recent_errors[0], "err-15");
    }

    #[test]
    fn hints_flag_low_success_and_slow_patterns() {
        let mut stats = PatternStats::default();
        stats.observe(&EventSample::failure(45.0, "timeout"));
        stats.observe(&EventSample::failure(45.0, "timeout"));
        stats.observe(&EventSample::success(45.0));

        let hints = stats.hints();
        assert_eq!(hints.len(), 3);
        assert!(hints[0].contains("Low success rate"));
        assert!(hints[1].contains("High average duration"));
        assert!(hints[2].contains("timeout"));
    }

    #[test]
    fn healthy_pattern_produces_no_hints() {
        let mut stats = PatternStats::default();
        stats.observe(&EventSample::success(5.0));
        stats.observe(&EventSample::success(6.0));
        assert!(stats.hints().is_empty());
    }
}
