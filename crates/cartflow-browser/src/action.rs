//! Page action plans: the unit of work the driver executes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scripted step against the live page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageAction {
    Navigate {
        url: String,
    },
    Click {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    Fill {
        selector: String,
        text: String,
    },
    /// Keystroke-by-keystroke input; the delay comes from the plan pacing.
    TypeText {
        selector: String,
        text: String,
    },
    Press {
        key: String,
    },
    WaitFor {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    ExtractText {
        selector: String,
    },
    Scroll {
        pixels: i64,
    },
    Screenshot {
        file_name: String,
    },
    Evaluate {
        expression: String,
    },
    /// Randomized pause inside the runner, bounded in milliseconds.
    Pause {
        min_ms: u64,
        max_ms: u64,
    },
}

/// A labelled sequence of actions executed under one pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionPlan {
    pub label: String,
    pub actions: Vec<PageAction>,
    pub timeout_secs: u64,
}

impl ActionPlan {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            actions: Vec::new(),
            timeout_secs: 180,
        }
    }

    pub fn push(mut self, action: PageAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// What came back from executing a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanOutcome {
    pub label: String,
    pub ok: bool,
    pub duration_ms: u64,
    /// Per-action outputs, in plan order (extracted text, evaluate
    /// results, screenshot paths).
    #[serde(default)]
    pub outputs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanOutcome {
    /// First extracted string among the outputs, if any.
    pub fn first_text(&self) -> Option<String> {
        self.outputs.iter().find_map(|value| {
            value
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }
}
