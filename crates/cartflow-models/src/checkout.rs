use serde::{Deserialize, Serialize};

/// Terminal status of a checkout execution.
///
/// Expected failures (stock gone, payment declined) surface as `Failed`;
/// `Error` is reserved for outcomes the procedure could classify but not
/// complete, so callers never need to parse error strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Success,
    Failed,
    Error,
}

/// Terminal record produced by one run of the checkout procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutOutcome {
    pub status: CheckoutStatus,
    pub duration_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckoutOutcome {
    pub fn success(duration_secs: f64, order_id: Option<String>) -> Self {
        Self {
            status: CheckoutStatus::Success,
            duration_secs,
            order_id,
            error: None,
        }
    }

    pub fn failed(duration_secs: f64, error: impl Into<String>) -> Self {
        Self {
            status: CheckoutStatus::Failed,
            duration_secs,
            order_id: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CheckoutStatus::Success
    }
}
