use async_trait::async_trait;

/// Fire-and-forget text delivery to an external messaging endpoint.
///
/// Implementations absorb their own failures; the harness never branches
/// on delivery state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Notifier that drops every message. Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _message: &str) {}
}
