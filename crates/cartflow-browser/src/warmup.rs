//! Pre-run warmup: staged natural browsing before any checkout trial.
//!
//! Each phase is best-effort. A failed phase is logged and the routine
//! moves on; warmup never blocks the harness run.

use std::sync::Arc;

use cartflow_memory::{EventSample, EventStore};
use cartflow_models::Profile;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{ActionPlan, PageAction};
use crate::driver::BrowserDriver;

/// Where the warmup browses before approaching the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupPlan {
    pub browse_urls: Vec<String>,
    pub storefront_url: String,
    pub search_term: String,
    pub product_url: String,
}

impl Default for WarmupPlan {
    fn default() -> Self {
        Self {
            browse_urls: vec![
                "https://news.example.com".to_string(),
                "https://weather.example.com".to_string(),
            ],
            storefront_url: "https://store.example.com".to_string(),
            search_term: "phone pro".to_string(),
            product_url: "https://store.example.com/product/phone-pro".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupOutcome {
    pub phases_completed: usize,
    pub phases_failed: usize,
}

pub struct WarmupRoutine {
    driver: Arc<dyn BrowserDriver>,
    store: Arc<EventStore>,
    plan: WarmupPlan,
}

impl WarmupRoutine {
    pub fn new(driver: Arc<dyn BrowserDriver>, store: Arc<EventStore>, plan: WarmupPlan) -> Self {
        Self {
            driver,
            store,
            plan,
        }
    }

    /// Run all warmup phases under the given profile's pacing.
    pub async fn run(&self, profile: &Profile) -> WarmupOutcome {
        info!(profile = %profile.name, "starting warmup browsing");
        let mut outcome = WarmupOutcome::default();

        for plan in self.phases(profile) {
            let label = plan.label.clone();
            match self.driver.run_plan(&plan).await {
                Ok(result) if result.ok => {
                    outcome.phases_completed += 1;
                    self.store.log(
                        &format!("warmup:{label}"),
                        EventSample::success(result.duration_ms as f64 / 1000.0),
                    );
                }
                Ok(result) => {
                    outcome.phases_failed += 1;
                    let error = result.error.unwrap_or_else(|| "action failed".to_string());
                    warn!(phase = %label, %error, "warmup phase failed, continuing");
                    self.store.log(
                        &format!("warmup:{label}"),
                        EventSample::failure(result.duration_ms as f64 / 1000.0, error),
                    );
                }
                Err(error) => {
                    outcome.phases_failed += 1;
                    warn!(phase = %label, %error, "warmup phase raised, continuing");
                    self.store.log(
                        &format!("warmup:{label}"),
                        EventSample::failure(0.0, error.to_string()),
                    );
                }
            }
        }

        info!(
            completed = outcome.phases_completed,
            failed = outcome.phases_failed,
            "warmup finished"
        );
        outcome
    }

    fn phases(&self, profile: &Profile) -> Vec<ActionPlan> {
        let browse_pause = pause_for(profile, 1.0, 3.0);
        let mut general = ActionPlan::new("general_browsing");
        for url in &self.plan.browse_urls {
            general = general
                .push(PageAction::Navigate { url: url.clone() })
                .push(PageAction::Scroll { pixels: 900 })
                .push(browse_pause.clone());
        }

        let storefront = ActionPlan::new("storefront_exploration")
            .push(PageAction::Navigate {
                url: self.plan.storefront_url.clone(),
            })
            .push(PageAction::Scroll { pixels: 1200 })
            .push(browse_pause.clone())
            .push(PageAction::Scroll { pixels: -600 });

        let research = ActionPlan::new("product_research")
            .push(PageAction::Click {
                selector: "[data-test='search-input']".to_string(),
                timeout_ms: Some(10_000),
            })
            .push(PageAction::TypeText {
                selector: "[data-test='search-input']".to_string(),
                text: self.plan.search_term.clone(),
            })
            .push(PageAction::Press {
                key: "Enter".to_string(),
            })
            .push(PageAction::Scroll { pixels: 800 })
            .push(browse_pause.clone());

        let preparation = ActionPlan::new("final_preparation")
            .push(PageAction::Navigate {
                url: self.plan.product_url.clone(),
            })
            .push(browse_pause);

        vec![general, storefront, research, preparation]
    }
}

fn pause_for(profile: &Profile, min_secs: f64, max_secs: f64) -> PageAction {
    let multiplier = profile.characteristics.delay_multiplier;
    PageAction::Pause {
        min_ms: (min_secs * multiplier * 1000.0) as u64,
        max_ms: (max_secs * multiplier * 1000.0) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::PlanOutcome;
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FlakyDriver {
        labels: Mutex<Vec<String>>,
        break_phase: &'static str,
    }

    #[async_trait]
    impl BrowserDriver for FlakyDriver {
        async fn run_plan(&self, plan: &ActionPlan) -> Result<PlanOutcome> {
            self.labels.lock().push(plan.label.clone());
            if plan.label == self.break_phase {
                bail!("navigation interrupted");
            }
            Ok(PlanOutcome {
                label: plan.label.clone(),
                ok: true,
                duration_ms: 100,
                outputs: vec![],
                error: None,
            })
        }
    }

    #[tokio::test]
    async fn broken_phase_does_not_stop_the_routine() {
        let driver = Arc::new(FlakyDriver {
            labels: Mutex::new(Vec::new()),
            break_phase: "storefront_exploration",
        });
        let store = Arc::new(EventStore::in_memory());
        let routine = WarmupRoutine::new(driver.clone(), store.clone(), WarmupPlan::default());

        let outcome = routine.run(&crate::pace::slow_profile()).await;

        assert_eq!(outcome.phases_completed, 3);
        assert_eq!(outcome.phases_failed, 1);
        assert_eq!(driver.labels.lock().len(), 4);

        let stats = store.pattern("warmup:storefront_exploration").unwrap();
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(
            stats.recent_errors,
            vec!["navigation interrupted".to_string()]
        );
    }

    #[tokio::test]
    async fn phases_run_in_browsing_order() {
        let driver = Arc::new(FlakyDriver {
            labels: Mutex::new(Vec::new()),
            break_phase: "none",
        });
        let store = Arc::new(EventStore::in_memory());
        let routine = WarmupRoutine::new(driver.clone(), store, WarmupPlan::default());

        routine.run(&crate::pace::slow_profile()).await;

        assert_eq!(
            *driver.labels.lock(),
            vec![
                "general_browsing",
                "storefront_exploration",
                "product_research",
                "final_preparation"
            ]
        );
    }
}
