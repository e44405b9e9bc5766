//! Trial execution: N sequential invocations of the checkout procedure
//! under one profile, with failure absorption at the iteration boundary.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cartflow_memory::{EventSample, EventStore};
use cartflow_models::{Profile, TimingRange, TrialOutcome};
use cartflow_traits::{CheckoutProcedure, ProfileHook};
use chrono::Utc;
use rand::RngExt;
use serde_json::json;
use tracing::{debug, info, warn};

/// Default courtesy pause between iterations, seconds.
const DEFAULT_PACING: TimingRange = TimingRange {
    min_secs: 2.0,
    max_secs: 5.0,
};

/// Runs the trial sequence for one profile at a time.
///
/// Trials never overlap: the procedure drives a single shared browser
/// context, so the runner is strictly sequential by design.
pub struct TrialRunner {
    store: Arc<EventStore>,
    iterations: u32,
    pacing: TimingRange,
    hook: Option<Arc<dyn ProfileHook>>,
}

impl TrialRunner {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            iterations: 1,
            pacing: DEFAULT_PACING,
            hook: None,
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: TimingRange) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn ProfileHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Execute the configured number of trials under `profile`.
    ///
    /// A procedure error is converted into a failed outcome and the loop
    /// continues; the returned sequence always has one entry per
    /// iteration.
    pub async fn run_trials(
        &self,
        profile: &Profile,
        procedure: &dyn CheckoutProcedure,
    ) -> Vec<TrialOutcome> {
        if let Some(hook) = &self.hook {
            if let Err(error) = hook.apply_profile(profile).await {
                warn!(
                    %error,
                    profile = %profile.name,
                    "profile hand-off failed, trials continue with default context"
                );
            }
        }

        let mut outcomes = Vec::with_capacity(self.iterations as usize);
        for iteration in 1..=self.iterations {
            debug!(
                profile = %profile.name,
                iteration,
                total = self.iterations,
                "starting trial"
            );

            let started = Instant::now();
            let outcome = match procedure.execute(profile).await {
                Ok(result) => {
                    let duration_secs = started.elapsed().as_secs_f64();
                    TrialOutcome {
                        iteration,
                        success: result.is_success(),
                        duration_secs,
                        timestamp: Utc::now(),
                        error: result.error,
                    }
                }
                Err(error) => {
                    warn!(
                        profile = %profile.name,
                        iteration,
                        %error,
                        "trial raised unexpectedly"
                    );
                    TrialOutcome::failed(iteration, 0.0, error.to_string())
                }
            };

            info!(
                profile = %profile.name,
                iteration,
                success = outcome.success,
                duration_secs = outcome.duration_secs,
                "trial finished"
            );

            self.store.log(
                &format!("ab_test_iteration:{}", profile.name),
                EventSample {
                    success: Some(outcome.success),
                    duration_secs: Some(outcome.duration_secs),
                    error: outcome.error.clone(),
                    payload: json!({ "iteration": outcome.iteration }),
                },
            );
            outcomes.push(outcome);

            if iteration < self.iterations {
                tokio::time::sleep(self.pause()).await;
            }
        }
        outcomes
    }

    fn pause(&self) -> Duration {
        let TimingRange { min_secs, max_secs } = self.pacing;
        let secs = if max_secs > min_secs {
            rand::rng().random_range(min_secs..=max_secs)
        } else {
            min_secs
        };
        Duration::from_secs_f64(secs.max(0.0))
    }
}
