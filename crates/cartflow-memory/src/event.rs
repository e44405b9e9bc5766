use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Observation attached to a logged event.
///
/// `success` and `duration_secs` feed the pattern aggregates; `payload`
/// travels with the session log only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl EventSample {
    pub fn success(duration_secs: f64) -> Self {
        Self {
            success: Some(true),
            duration_secs: Some(duration_secs),
            ..Default::default()
        }
    }

    pub fn failure(duration_secs: f64, error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            duration_secs: Some(duration_secs),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn info(payload: Value) -> Self {
        Self {
            payload,
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Timestamped record appended to the current session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    #[serde(flatten)]
    pub sample: EventSample,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// One harness run as persisted in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl SessionRecord {
    pub fn started_now() -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Self {
            session_id: token[..12].to_string(),
            started_at: Utc::now(),
            ended_at: None,
            status: SessionStatus::Active,
            events: Vec::new(),
        }
    }
}
