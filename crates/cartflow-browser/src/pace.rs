//! Concrete delays derived from a profile's timing plan.

use cartflow_models::Profile;
use serde::{Deserialize, Serialize};

/// Millisecond pacing handed to the runner script. All ranges are already
/// scaled by the profile's delay multiplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pacing {
    pub profile_name: String,
    pub page_load_wait_ms: (u64, u64),
    pub action_delay_ms: (u64, u64),
    pub typing_delay_ms: u64,
    pub delay_multiplier: f64,
}

impl Pacing {
    pub fn from_profile(profile: &Profile) -> Self {
        let multiplier = profile.characteristics.delay_multiplier;
        let page_load = profile.timing.page_load_wait.scaled(multiplier);
        let action = profile.timing.action_delay.scaled(multiplier);
        Self {
            profile_name: profile.name.clone(),
            page_load_wait_ms: to_ms_range(page_load.min_secs, page_load.max_secs),
            action_delay_ms: to_ms_range(action.min_secs, action.max_secs),
            // Per-keystroke delay: the midpoint of the typing range.
            typing_delay_ms: (profile.timing.typing_delay.midpoint_secs() * 1000.0) as u64,
            delay_multiplier: multiplier,
        }
    }

    /// Neutral pacing for runs outside any profile (warmup preflight,
    /// manual plans).
    pub fn relaxed() -> Self {
        Self {
            profile_name: "default".to_string(),
            page_load_wait_ms: (2000, 4000),
            action_delay_ms: (800, 2000),
            typing_delay_ms: 80,
            delay_multiplier: 1.0,
        }
    }
}

fn to_ms_range(min_secs: f64, max_secs: f64) -> (u64, u64) {
    let min = (min_secs.max(0.0) * 1000.0) as u64;
    let max = (max_secs.max(0.0) * 1000.0) as u64;
    (min, max.max(min))
}

/// Shared fixture: the slow high-stealth preset shape.
#[cfg(test)]
pub(crate) fn slow_profile() -> Profile {
    use cartflow_models::{
        BehaviorPlan, Characteristics, ClickPrecision, ErrorHandling, ErrorRecovery,
        ExecutionSpeed, FormFilling, HumanSimulation, MousePace, RiskTolerance, ScrollPattern,
        StealthLevel, TimingPlan, TimingRange,
    };
    Profile::new(
        "profile_a",
        "Conservative",
        Characteristics {
            speed: ExecutionSpeed::Slow,
            stealth_level: StealthLevel::Maximum,
            risk_tolerance: RiskTolerance::Low,
            human_simulation: HumanSimulation::High,
            delay_multiplier: 2.0,
            error_recovery: ErrorRecovery::Cautious,
        },
        TimingPlan {
            page_load_wait: TimingRange::new(5.0, 10.0),
            action_delay: TimingRange::new(2.0, 5.0),
            typing_delay: TimingRange::new(0.1, 0.3),
            mouse_pace: MousePace::Slow,
        },
        BehaviorPlan {
            scroll_pattern: ScrollPattern::Natural,
            click_precision: ClickPrecision::Human,
            form_filling: FormFilling::Gradual,
            error_handling: ErrorHandling::RetryWithDelay,
        },
    )
    .unwrap()
}
