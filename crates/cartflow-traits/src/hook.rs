use anyhow::Result;
use async_trait::async_trait;
use cartflow_models::Profile;

/// Hand-off of the active profile's parameters into the execution context,
/// invoked before a profile's first trial. Failures are logged by the
/// caller and never abort the trial sequence.
#[async_trait]
pub trait ProfileHook: Send + Sync {
    async fn apply_profile(&self, profile: &Profile) -> Result<()>;
}
