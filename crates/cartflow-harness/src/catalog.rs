//! Profile catalog: fixed presets plus one profile derived from history.

use anyhow::Result;
use cartflow_memory::EventStore;
use cartflow_models::{
    BehaviorPlan, Characteristics, ClickPrecision, ErrorHandling, ErrorRecovery, ExecutionSpeed,
    FormFilling, HumanSimulation, MousePace, Profile, RiskTolerance, ScrollPattern, StealthLevel,
    TimingPlan, TimingRange,
};
use tracing::{debug, info};

/// Produces the ordered set of profiles for one test session.
pub struct ProfileCatalog;

impl ProfileCatalog {
    /// Generate up to `max_profiles` profiles: the base presets in order,
    /// plus a `Historical_Best` profile when the event store holds a
    /// qualifying success pattern.
    ///
    /// The historical profile is never silently dropped by the quota: if
    /// the presets already fill it, the last preset is evicted instead.
    pub fn generate(max_profiles: usize, store: &EventStore) -> Result<Vec<Profile>> {
        let mut profiles = vec![conservative()?, balanced()?, aggressive()?];

        let historical = match store.best_pattern() {
            Some((kind, stats)) => {
                info!(
                    pattern = %kind,
                    success_rate = stats.success_rate,
                    observations = stats.count,
                    "deriving profile from historical best pattern"
                );
                Some(historical_best(stats.success_rate)?)
            }
            None => {
                debug!("no qualifying historical pattern, presets only");
                None
            }
        };

        if let Some(historical) = historical {
            if profiles.len() >= max_profiles && max_profiles > 0 {
                profiles.truncate(max_profiles - 1);
            }
            profiles.push(historical);
        }
        profiles.truncate(max_profiles);
        Ok(profiles)
    }
}

/// Low risk, high stealth, everything slowed down.
fn conservative() -> Result<Profile> {
    Ok(Profile::new(
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
    )?)
}

/// Medium risk, balanced performance.
fn balanced() -> Result<Profile> {
    Ok(Profile::new(
        "profile_b",
        "Balanced",
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
    )?)
}

/// Higher risk, faster execution.
fn aggressive() -> Result<Profile> {
    Ok(Profile::new(
        "profile_c",
        "Aggressive",
        Characteristics {
            speed: ExecutionSpeed::Fast,
            stealth_level: StealthLevel::Medium,
            risk_tolerance: RiskTolerance::High,
            human_simulation: HumanSimulation::Low,
            delay_multiplier: 1.0,
            error_recovery: ErrorRecovery::Quick,
        },
        TimingPlan {
            page_load_wait: TimingRange::new(2.0, 4.0),
            action_delay: TimingRange::new(0.5, 2.0),
            typing_delay: TimingRange::new(0.02, 0.1),
            mouse_pace: MousePace::Fast,
        },
        BehaviorPlan {
            scroll_pattern: ScrollPattern::Direct,
            click_precision: ClickPrecision::Precise,
            form_filling: FormFilling::Rapid,
            error_handling: ErrorHandling::ImmediateRetry,
        },
    )?)
}

/// Seeded from the most successful observed pattern.
fn historical_best(seed_success_rate: f64) -> Result<Profile> {
    Ok(Profile::new(
        "profile_historical",
        "Historical_Best",
        Characteristics {
            speed: ExecutionSpeed::Adaptive,
            stealth_level: StealthLevel::Maximum,
            risk_tolerance: RiskTolerance::Low,
            human_simulation: HumanSimulation::High,
            delay_multiplier: 1.8,
            error_recovery: ErrorRecovery::PatternBased,
        },
        TimingPlan {
            page_load_wait: TimingRange::new(4.0, 8.0),
            action_delay: TimingRange::new(1.5, 4.0),
            typing_delay: TimingRange::new(0.08, 0.25),
            mouse_pace: MousePace::Natural,
        },
        BehaviorPlan {
            scroll_pattern: ScrollPattern::Learned,
            click_precision: ClickPrecision::Optimized,
            form_filling: FormFilling::PatternBased,
            error_handling: ErrorHandling::HistoricalBest,
        },
    )?
    .with_seed_success_rate(seed_success_rate))
}
