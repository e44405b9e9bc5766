//! Profile schema - a named bundle of behavioral parameters under comparison.
//!
//! Profiles are created once per test session by the catalog, validated at
//! construction, and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionSpeed {
    Slow,
    Medium,
    Fast,
    Adaptive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StealthLevel {
    Maximum,
    High,
    Medium,
    Low,
}

impl StealthLevel {
    /// Base stealth score used by the aggregator before penalties apply.
    pub fn base_score(self) -> f64 {
        match self {
            StealthLevel::Maximum => 1.0,
            StealthLevel::High => 0.8,
            StealthLevel::Medium => 0.6,
            StealthLevel::Low => 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HumanSimulation {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRecovery {
    Cautious,
    Adaptive,
    Quick,
    PatternBased,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MousePace {
    Slow,
    Medium,
    Fast,
    Natural,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPattern {
    Natural,
    Varied,
    Direct,
    Learned,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClickPrecision {
    Human,
    Accurate,
    Precise,
    Optimized,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormFilling {
    Gradual,
    Steady,
    Rapid,
    PatternBased,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandling {
    RetryWithDelay,
    SmartRetry,
    ImmediateRetry,
    HistoricalBest,
}

/// Inclusive numeric range in seconds for a timing knob.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimingRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl TimingRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Scale both bounds by a positive multiplier.
    pub fn scaled(self, multiplier: f64) -> Self {
        Self {
            min_secs: self.min_secs * multiplier,
            max_secs: self.max_secs * multiplier,
        }
    }

    pub fn midpoint_secs(self) -> f64 {
        (self.min_secs + self.max_secs) / 2.0
    }
}

/// Qualitative knobs of a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Characteristics {
    pub speed: ExecutionSpeed,
    pub stealth_level: StealthLevel,
    pub risk_tolerance: RiskTolerance,
    pub human_simulation: HumanSimulation,
    pub delay_multiplier: f64,
    pub error_recovery: ErrorRecovery,
}

/// Named timing parameters of a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingPlan {
    pub page_load_wait: TimingRange,
    pub action_delay: TimingRange,
    pub typing_delay: TimingRange,
    pub mouse_pace: MousePace,
}

/// Behavioral style tags of a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviorPlan {
    pub scroll_pattern: ScrollPattern,
    pub click_precision: ClickPrecision,
    pub form_filling: FormFilling,
    pub error_handling: ErrorHandling,
}

/// A named, immutable configuration bundle under comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub characteristics: Characteristics,
    pub timing: TimingPlan,
    pub behavior: BehaviorPlan,
    /// Observed success rate attached when derived from historical data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_success_rate: Option<f64>,
}

impl Profile {
    /// Construct a profile, rejecting malformed parameters up front.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        characteristics: Characteristics,
        timing: TimingPlan,
        behavior: BehaviorPlan,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let multiplier = characteristics.delay_multiplier;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ModelError::InvalidProfile {
                id,
                reason: format!("delay_multiplier must be positive, got {multiplier}"),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            characteristics,
            timing,
            behavior,
            seed_success_rate: None,
        })
    }

    pub fn with_seed_success_rate(mut self, rate: f64) -> Self {
        self.seed_success_rate = Some(rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristics(multiplier: f64) -> Characteristics {
        Characteristics {
            speed: ExecutionSpeed::Medium,
            stealth_level: StealthLevel::High,
            risk_tolerance: RiskTolerance::Medium,
            human_simulation: HumanSimulation::Medium,
            delay_multiplier: multiplier,
            error_recovery: ErrorRecovery::Adaptive,
        }
    }

    fn timing() -> TimingPlan {
        TimingPlan {
            page_load_wait: TimingRange::new(3.0, 7.0),
            action_delay: TimingRange::new(1.0, 3.0),
            typing_delay: TimingRange::new(0.05, 0.2),
            mouse_pace: MousePace::Medium,
        }
    }

    fn behavior() -> BehaviorPlan {
        BehaviorPlan {
            scroll_pattern: ScrollPattern::Varied,
            click_precision: ClickPrecision::Accurate,
            form_filling: FormFilling::Steady,
            error_handling: ErrorHandling::SmartRetry,
        }
    }

    #[test]
    fn rejects_non_positive_delay_multiplier() {
        let err = Profile::new("p1", "Test", characteristics(0.0), timing(), behavior());
        assert!(err.is_err());

        let err = Profile::new("p1", "Test", characteristics(-1.5), timing(), behavior());
        assert!(err.is_err());

        let err = Profile::new("p1", "Test", characteristics(f64::NAN), timing(), behavior());
        assert!(err.is_err());
    }

    #[test]
    fn accepts_valid_profile() {
        let profile =
            Profile::new("p1", "Test", characteristics(1.5), timing(), behavior()).unwrap();
        assert_eq!(profile.name, "Test");
        assert!(profile.seed_success_rate.is_none());

        let seeded = profile.with_seed_success_rate(0.8);
        assert_eq!(seeded.seed_success_rate, Some(0.8));
    }

    #[test]
    fn timing_range_scales_both_bounds() {
        let range = TimingRange::new(2.0, 4.0).scaled(1.5);
        assert_eq!(range.min_secs, 3.0);
        assert_eq!(range.max_secs, 6.0);
        assert_eq!(range.midpoint_secs(), 4.5);
    }

    #[test]
    fn stealth_base_scores_are_ordered() {
        assert_eq!(StealthLevel::Maximum.base_score(), 1.0);
        assert_eq!(StealthLevel::High.base_score(), 0.8);
        assert_eq!(StealthLevel::Medium.base_score(), 0.6);
        assert_eq!(StealthLevel::Low.base_score(), 0.4);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&StealthLevel::Maximum).unwrap();
        assert_eq!(json, "\"maximum\"");
        let json = serde_json::to_string(&ErrorHandling::RetryWithDelay).unwrap();
        assert_eq!(json, "\"retry_with_delay\"");
    }
}
