use anyhow::Result;
use async_trait::async_trait;
use cartflow_models::{CheckoutOutcome, Profile};

/// One execution of the checkout flow under the given profile.
///
/// Implementations hold their own execution context (browser session, target
/// configuration, event-store handle). Expected failures must be reflected
/// via `CheckoutOutcome::status`; an `Err` is reserved for unexpected
/// infrastructure errors, which the trial runner catches and records as a
/// failed trial.
#[async_trait]
pub trait CheckoutProcedure: Send + Sync {
    async fn execute(&self, profile: &Profile) -> Result<CheckoutOutcome>;
}
