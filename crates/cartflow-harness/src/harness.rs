//! The orchestrator: catalog -> trials -> scores -> report.

use std::sync::Arc;

use anyhow::Result;
use cartflow_memory::{EventSample, EventStore};
use cartflow_models::{TestReport, TestSession, TimingRange};
use cartflow_traits::{CheckoutProcedure, DetectionPenalty, Notifier, NullNotifier, ProfileHook};
use serde_json::json;
use tracing::info;

use crate::catalog::ProfileCatalog;
use crate::report::SessionReport;
use crate::runner::TrialRunner;
use crate::score::ScoreAggregator;

/// Tunables of one harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Profile quota handed to the catalog.
    pub max_profiles: usize,
    /// Trials per profile.
    pub iterations: u32,
    /// Courtesy pause between iterations, seconds.
    pub pacing: TimingRange,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_profiles: 3,
            iterations: 1,
            pacing: TimingRange::new(2.0, 5.0),
        }
    }
}

/// Owns one event store and the injected collaborators for a full
/// scoring run. Profiles and their iterations execute strictly
/// sequentially: they share a single live browser context.
pub struct TestHarness {
    store: Arc<EventStore>,
    procedure: Arc<dyn CheckoutProcedure>,
    notifier: Arc<dyn Notifier>,
    hook: Option<Arc<dyn ProfileHook>>,
    aggregator: ScoreAggregator,
    config: HarnessConfig,
}

impl TestHarness {
    pub fn new(store: Arc<EventStore>, procedure: Arc<dyn CheckoutProcedure>) -> Self {
        Self {
            store,
            procedure,
            notifier: Arc::new(NullNotifier),
            hook: None,
            aggregator: ScoreAggregator::new(),
            config: HarnessConfig::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn ProfileHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_penalty(mut self, penalty: Box<dyn DetectionPenalty>) -> Self {
        self.aggregator = ScoreAggregator::with_penalty(penalty);
        self
    }

    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full evaluation and return the exported report.
    ///
    /// Per-trial and per-profile failures are absorbed into scores; only
    /// setup failures (catalog construction, session bookkeeping)
    /// propagate.
    pub async fn run(&self) -> Result<TestReport> {
        let mut session = TestSession::new();
        let profiles = ProfileCatalog::generate(self.config.max_profiles, &self.store)?;

        info!(
            session_id = %session.session_id,
            profiles = profiles.len(),
            iterations = self.config.iterations,
            "starting profile evaluation"
        );
        self.notifier
            .notify(&format!(
                "Profile evaluation {} started: {} profiles, {} iteration(s) each",
                session.session_id,
                profiles.len(),
                self.config.iterations
            ))
            .await;

        let mut runner = TrialRunner::new(self.store.clone())
            .with_iterations(self.config.iterations)
            .with_pacing(self.config.pacing);
        if let Some(hook) = &self.hook {
            runner = runner.with_hook(hook.clone());
        }

        for (index, profile) in profiles.iter().enumerate() {
            info!(
                profile = %profile.name,
                position = index + 1,
                total = profiles.len(),
                "testing profile"
            );
            let outcomes = runner.run_trials(profile, self.procedure.as_ref()).await;
            let analysis = self.aggregator.analyze(profile, &outcomes);
            self.notifier
                .notify(&format!(
                    "Profile {} finished: {:.0}% success, score {:.2}",
                    profile.name,
                    analysis.success_rate * 100.0,
                    analysis.overall_score
                ))
                .await;
            session.record(analysis)?;
        }

        let best = SessionReport::select_best(&session.results);
        session.finalize(best)?;

        self.store.log(
            "ab_test_session",
            EventSample::info(json!({
                "session_id": session.session_id,
                "profiles_tested": session.profiles_tested,
                "best_profile": session.best_profile.as_ref().map(|b| b.profile.name.clone()),
                "best_score": session.best_profile.as_ref().map(|b| b.overall_score),
            })),
        );

        let report = SessionReport::export(&session, &profiles);
        match &session.best_profile {
            Some(best) => {
                info!(
                    best = %best.profile.name,
                    score = best.overall_score,
                    "profile evaluation finished"
                );
                self.notifier
                    .notify(&format!(
                        "Evaluation {} finished. Best profile: {} (score {:.2})",
                        session.session_id, best.profile.name, best.overall_score
                    ))
                    .await;
            }
            None => {
                self.notifier
                    .notify(&format!(
                        "Evaluation {} finished with no profiles tested",
                        session.session_id
                    ))
                    .await;
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use cartflow_models::{CheckoutOutcome, Profile, SessionState};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AlwaysSucceeds {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CheckoutProcedure for AlwaysSucceeds {
        async fn execute(&self, _profile: &Profile) -> Result<CheckoutOutcome> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(CheckoutOutcome::success(10.0, Some("W0001".to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    fn instant_config() -> HarnessConfig {
        HarnessConfig {
            max_profiles: 3,
            iterations: 1,
            pacing: TimingRange::new(0.0, 0.0),
        }
    }

    #[tokio::test]
    async fn full_run_selects_the_stealthiest_preset() {
        let store = Arc::new(EventStore::in_memory());
        let procedure = Arc::new(AlwaysSucceeds {
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let harness = TestHarness::new(store.clone(), procedure.clone())
            .with_notifier(notifier.clone())
            .with_config(instant_config());

        let report = harness.run().await.unwrap();

        assert_eq!(procedure.calls.load(Ordering::Relaxed), 3);
        assert_eq!(report.session.state, SessionState::Finalized);
        assert_eq!(report.summary.profiles_tested, 3);

        // Every profile succeeded; stealth decides the ranking.
        for analysis in &report.session.results {
            assert!((analysis.success_rate - 1.0).abs() < 1e-9);
        }
        let best = report.session.best_profile.as_ref().unwrap();
        assert_eq!(best.profile.name, "Conservative");
        assert_eq!(best.rank, Some(1));

        // Session and per-profile events were logged.
        assert!(store.pattern("ab_test_iteration:Balanced").is_some());
        assert!(store.pattern("ab_test_session").is_some());

        // Lifecycle notifications: start + 3 profiles + end.
        assert_eq!(notifier.messages.lock().len(), 5);
    }

    #[tokio::test]
    async fn quota_of_zero_completes_with_empty_report() {
        let store = Arc::new(EventStore::in_memory());
        let procedure = Arc::new(AlwaysSucceeds {
            calls: AtomicUsize::new(0),
        });
        let mut config = instant_config();
        config.max_profiles = 0;
        let harness = TestHarness::new(store, procedure).with_config(config);

        let report = harness.run().await.unwrap();
        assert!(report.session.best_profile.is_none());
        assert_eq!(
            report.recommendations,
            vec!["No test results available for recommendations".to_string()]
        );
    }
}
