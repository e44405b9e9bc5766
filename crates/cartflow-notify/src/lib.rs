//! CartFlow Notify - fire-and-forget delivery of run lifecycle messages.
//!
//! The only implementation talks to the Telegram Bot API. Delivery is
//! best-effort by contract: transport failures and business-level
//! rejections are logged at `warn` and swallowed, so the scoring core
//! never branches on messaging state.

use async_trait::async_trait;
use cartflow_traits::Notifier;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub use cartflow_traits::NullNotifier;

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
    error_code: Option<i32>,
}

/// Telegram-backed notification sink.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: impl Into<String>) -> Self {
        Self::with_endpoint(
            format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
            chat_id,
        )
    }

    /// Point the sink somewhere else (tests, relays).
    pub fn with_endpoint(endpoint: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            chat_id: chat_id.into(),
        }
    }

    async fn deliver(&self, message: &str) -> Result<(), String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "chat_id": self.chat_id, "text": message }))
            .send()
            .await
            .map_err(|e| format!("transport error: {e}"))?;

        // The Bot API can answer HTTP 200 with ok: false for business
        // errors, so the body decides.
        let body = response.text().await.unwrap_or_default();
        let parsed: BotApiResponse =
            serde_json::from_str(&body).map_err(|e| format!("unparseable response: {e}"))?;

        if parsed.ok {
            Ok(())
        } else {
            Err(parsed
                .description
                .unwrap_or_else(|| format!("error code {:?}", parsed.error_code)))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        match self.deliver(message).await {
            Ok(()) => debug!("notification delivered"),
            Err(error) => warn!(%error, "notification dropped"),
        }
    }
}
