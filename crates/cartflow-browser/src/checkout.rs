//! The linear checkout procedure: a fixed sequence of paced action plans
//! ending in a terminal outcome.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use cartflow_memory::{EventSample, EventStore};
use cartflow_models::{CheckoutOutcome, Profile};
use cartflow_traits::CheckoutProcedure;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{ActionPlan, PageAction};
use crate::driver::{BrowserDriver, artifact_name};

/// What to buy and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutTarget {
    pub product_url: String,
    pub model: String,
    pub storage: String,
    pub color: String,
    pub carrier: String,
}

impl Default for CheckoutTarget {
    fn default() -> Self {
        Self {
            product_url: "https://store.example.com/product/phone-pro".to_string(),
            model: "Phone Pro Max".to_string(),
            storage: "1TB".to_string(),
            color: "Natural Titanium".to_string(),
            carrier: "Unlocked".to_string(),
        }
    }
}

mod selectors {
    pub const PRODUCT_TITLE: &str = "[data-test='product-title']";
    pub const MODEL_OPTION: &str = "[data-test='model-option']";
    pub const STORAGE_OPTION: &str = "[data-test='storage-option']";
    pub const COLOR_OPTION: &str = "[data-test='color-option']";
    pub const CARRIER_OPTION: &str = "[data-test='carrier-option']";
    pub const ADD_TO_CART: &str = "[data-test='add-to-cart']";
    pub const CART_CONFIRMATION: &str = "[data-test='cart-confirmation']";
    pub const CART_LINK: &str = "[data-test='cart-link']";
    pub const CART_TOTAL: &str = "[data-test='cart-total']";
    pub const CHECKOUT_BUTTON: &str = "[data-test='checkout-button']";
    pub const PAYMENT_FORM: &str = "[data-test='payment-form']";
    pub const PLACE_ORDER: &str = "[data-test='place-order']";
    pub const ORDER_CONFIRMED: &str = "[data-test='order-confirmed']";
    pub const ORDER_NUMBER: &str = "[data-test='order-number']";
}

/// Drives the fixed checkout sequence through the injected driver.
///
/// Expected failures (a step's plan reports `ok = false`) terminate the
/// run with a `Failed` outcome; only driver infrastructure errors
/// propagate as `Err`, which the trial runner absorbs per iteration.
pub struct CheckoutFlow {
    driver: Arc<dyn BrowserDriver>,
    store: Arc<EventStore>,
    target: CheckoutTarget,
}

impl CheckoutFlow {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        store: Arc<EventStore>,
        target: CheckoutTarget,
    ) -> Self {
        Self {
            driver,
            store,
            target,
        }
    }

    fn step_plans(&self, profile: &Profile) -> Vec<ActionPlan> {
        let settle = settle_pause(profile);
        let option = |selector: &str, label: &str| PageAction::Click {
            selector: format!("{selector}:has-text('{label}')"),
            timeout_ms: Some(15_000),
        };

        vec![
            ActionPlan::new("navigate")
                .push(PageAction::Navigate {
                    url: self.target.product_url.clone(),
                })
                .push(PageAction::WaitFor {
                    selector: selectors::PRODUCT_TITLE.to_string(),
                    timeout_ms: Some(20_000),
                }),
            ActionPlan::new("select_model")
                .push(option(selectors::MODEL_OPTION, &self.target.model))
                .push(settle.clone()),
            ActionPlan::new("configure_options")
                .push(option(selectors::STORAGE_OPTION, &self.target.storage))
                .push(option(selectors::COLOR_OPTION, &self.target.color))
                .push(option(selectors::CARRIER_OPTION, &self.target.carrier))
                .push(settle.clone()),
            ActionPlan::new("add_to_cart")
                .push(PageAction::Click {
                    selector: selectors::ADD_TO_CART.to_string(),
                    timeout_ms: Some(15_000),
                })
                .push(PageAction::WaitFor {
                    selector: selectors::CART_CONFIRMATION.to_string(),
                    timeout_ms: Some(20_000),
                }),
            ActionPlan::new("review_cart")
                .push(PageAction::Click {
                    selector: selectors::CART_LINK.to_string(),
                    timeout_ms: Some(15_000),
                })
                .push(PageAction::ExtractText {
                    selector: selectors::CART_TOTAL.to_string(),
                })
                .push(settle.clone()),
            ActionPlan::new("checkout")
                .push(PageAction::Click {
                    selector: selectors::CHECKOUT_BUTTON.to_string(),
                    timeout_ms: Some(15_000),
                })
                .push(PageAction::WaitFor {
                    selector: selectors::PAYMENT_FORM.to_string(),
                    timeout_ms: Some(30_000),
                }),
            ActionPlan::new("payment")
                .push(PageAction::Click {
                    selector: selectors::PLACE_ORDER.to_string(),
                    timeout_ms: Some(30_000),
                })
                .push(settle),
            ActionPlan::new("confirmation")
                .push(PageAction::WaitFor {
                    selector: selectors::ORDER_CONFIRMED.to_string(),
                    timeout_ms: Some(45_000),
                })
                .push(PageAction::ExtractText {
                    selector: selectors::ORDER_NUMBER.to_string(),
                })
                .push(PageAction::Screenshot {
                    file_name: artifact_name("order"),
                }),
        ]
    }
}

fn settle_pause(profile: &Profile) -> PageAction {
    let range = profile
        .timing
        .action_delay
        .scaled(profile.characteristics.delay_multiplier);
    PageAction::Pause {
        min_ms: (range.min_secs.max(0.0) * 1000.0) as u64,
        max_ms: (range.max_secs.max(0.0) * 1000.0) as u64,
    }
}

#[async_trait]
impl CheckoutProcedure for CheckoutFlow {
    async fn execute(&self, profile: &Profile) -> Result<CheckoutOutcome> {
        let started = Instant::now();
        let mut order_id = None;

        for plan in self.step_plans(profile) {
            let outcome = self.driver.run_plan(&plan).await?;
            self.store.log(
                &format!("checkout_step:{}", plan.label),
                EventSample {
                    success: Some(outcome.ok),
                    duration_secs: Some(outcome.duration_ms as f64 / 1000.0),
                    error: outcome.error.clone(),
                    payload: serde_json::Value::Null,
                },
            );

            if !outcome.ok {
                let detail = outcome
                    .error
                    .unwrap_or_else(|| "action failed".to_string());
                warn!(step = %plan.label, %detail, "checkout step failed");
                return Ok(CheckoutOutcome::failed(
                    started.elapsed().as_secs_f64(),
                    format!("step '{}' failed: {detail}", plan.label),
                ));
            }

            if plan.label == "confirmation" {
                order_id = outcome.first_text();
            }
        }

        let duration_secs = started.elapsed().as_secs_f64();
        info!(
            profile = %profile.name,
            duration_secs,
            order_id = order_id.as_deref().unwrap_or("unknown"),
            "checkout completed"
        );
        Ok(CheckoutOutcome::success(duration_secs, order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::PlanOutcome;
    use anyhow::bail;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Driver stub that succeeds until a chosen step, then fails or errors.
    struct ScriptedDriver {
        labels: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        error_on: Option<&'static str>,
    }

    impl ScriptedDriver {
        fn passing() -> Self {
            Self {
                labels: Mutex::new(Vec::new()),
                fail_on: None,
                error_on: None,
            }
        }

        fn failing_at(step: &'static str) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::passing()
            }
        }

        fn erroring_at(step: &'static str) -> Self {
            Self {
                error_on: Some(step),
                ..Self::passing()
            }
        }
    }

    #[async_trait]
    impl BrowserDriver for ScriptedDriver {
        async fn run_plan(&self, plan: &ActionPlan) -> Result<PlanOutcome> {
            self.labels.lock().push(plan.label.clone());
            if self.error_on == Some(plan.label.as_str()) {
                bail!("node runner timed out after 180 seconds");
            }
            if self.fail_on == Some(plan.label.as_str()) {
                return Ok(PlanOutcome {
                    label: plan.label.clone(),
                    ok: false,
                    duration_ms: 500,
                    outputs: vec![],
                    error: Some("locator not visible".to_string()),
                });
            }
            let outputs = if plan.label == "confirmation" {
                vec![json!({ "type": "extract_text", "value": "W987654321" })]
            } else {
                vec![]
            };
            Ok(PlanOutcome {
                label: plan.label.clone(),
                ok: true,
                duration_ms: 500,
                outputs,
                error: None,
            })
        }
    }

    fn flow(driver: Arc<ScriptedDriver>) -> (CheckoutFlow, Arc<EventStore>) {
        let store = Arc::new(EventStore::in_memory());
        (
            CheckoutFlow::new(driver, store.clone(), CheckoutTarget::default()),
            store,
        )
    }

    #[tokio::test]
    async fn full_sequence_succeeds_with_order_id() {
        let driver = Arc::new(ScriptedDriver::passing());
        let (flow, store) = flow(driver.clone());

        let outcome = flow
            .execute(&crate::pace::slow_profile())
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.order_id.as_deref(), Some("W987654321"));
        assert_eq!(
            *driver.labels.lock(),
            vec![
                "navigate",
                "select_model",
                "configure_options",
                "add_to_cart",
                "review_cart",
                "checkout",
                "payment",
                "confirmation"
            ]
        );
        assert!(store.pattern("checkout_step:navigate").is_some());
    }

    #[tokio::test]
    async fn failed_step_short_circuits_without_raising() {
        let driver = Arc::new(ScriptedDriver::failing_at("add_to_cart"));
        let (flow, store) = flow(driver.clone());

        let outcome = flow
            .execute(&crate::pace::slow_profile())
            .await
            .unwrap();

        assert!(!outcome.is_success());
        let error = outcome.error.unwrap();
        assert!(error.contains("add_to_cart"));
        assert!(error.contains("locator not visible"));
        // Later steps never ran.
        assert_eq!(driver.labels.lock().len(), 4);
        let stats = store.pattern("checkout_step:add_to_cart").unwrap();
        assert_eq!(stats.success_rate, 0.0);
    }

    #[tokio::test]
    async fn driver_infrastructure_error_propagates() {
        let driver = Arc::new(ScriptedDriver::erroring_at("checkout"));
        let (flow, _store) = flow(driver);

        let result = flow.execute(&crate::pace::slow_profile()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[test]
    fn plans_are_paced_by_the_profile_multiplier() {
        let driver = Arc::new(ScriptedDriver::passing());
        let (flow, _store) = flow(driver);

        let plans = flow.step_plans(&crate::pace::slow_profile());
        let settle = plans[1]
            .actions
            .iter()
            .find_map(|action| match action {
                PageAction::Pause { min_ms, max_ms } => Some((*min_ms, *max_ms)),
                _ => None,
            })
            .unwrap();
        // (2..5)s action delay scaled by the 2.0 multiplier.
        assert_eq!(settle, (4_000, 10_000));
    }
}
