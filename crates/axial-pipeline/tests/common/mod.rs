//! Deterministic stand-ins for the generative model.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axial_core::FeedbackRecord;
use axial_model::{ModelClient, ModelError, ModelRequest, ModelResponse};
use serde_json::json;

/// How the stub answers for one alert.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail,
}

/// Answers per alert id, parsed back out of the rendered prompt.
pub struct StubModel {
    replies: HashMap<String, Reply>,
    default: Reply,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubModel {
    pub fn new(default: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            default,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answers every alert with a well-formed classification.
    pub fn classifying(theme: &str) -> Self {
        Self::new(Reply::Text(classification(theme, "HIGH")))
    }

    pub fn reply(mut self, alert_id: &str, reply: Reply) -> Self {
        self.replies.insert(alert_id.to_string(), reply);
        self
    }

    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Alert ids seen, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let alert_id = request
            .prompt
            .lines()
            .find_map(|line| line.strip_prefix("Alert ID: "))
            .unwrap_or("<trends>")
            .to_string();
        self.calls.lock().unwrap().push(alert_id.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&alert_id).unwrap_or(&self.default) {
            Reply::Text(text) => Ok(ModelResponse { text: text.clone() }),
            Reply::Fail => Err(ModelError::Api {
                status: 500,
                code: "INTERNAL".into(),
                message: "stub failure".into(),
            }),
        }
    }
}

pub fn classification(theme: &str, confidence: &str) -> String {
    json!({
        "theme": theme,
        "confidence": confidence,
        "reasoning": "Analyst names the team responsible.",
        "missing_context": "Who the internal teams are.",
        "trend_insight": "Internal testing is flagged as malicious."
    })
    .to_string()
}

pub fn record(alert_id: &str, comment: &str) -> FeedbackRecord {
    serde_json::from_value(json!({
        "alert_id": alert_id,
        "metadata": {
            "human_comment": comment,
            "account_short_name": "acme",
            "verdict": "True Positive - Benign",
            "triage_confirmation": "Declined"
        }
    }))
    .unwrap()
}

pub fn records(ids: &[&str]) -> Vec<FeedbackRecord> {
    ids.iter()
        .map(|id| record(id, "Legitimate application/binary"))
        .collect()
}
