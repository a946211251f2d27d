//! One model call per feedback record.

use std::sync::Arc;

use axial_core::assessment::strip_code_fences;
use axial_core::result::UNKNOWN_CONFIDENCE;
use axial_core::{ClassificationResult, FeedbackRecord, Theme};
use axial_model::{ModelClient, ModelError, ModelRequest};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::prompt::{CLASSIFY_SYSTEM_PROMPT, classification_prompt, classification_schema};

/// Why a record produced no result.
#[derive(Debug)]
pub enum SkipReason {
    /// The record has no identifier or no meaningful comment.
    Ineligible,
    /// The model call failed after retries.
    Model(ModelError),
    /// The model answered with something other than a JSON object.
    InvalidResponse(String),
    /// The call exceeded its time budget.
    TimedOut,
    /// The worker pool was shut down before the call started.
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ineligible => f.write_str("record is not eligible"),
            Self::Model(e) => write!(f, "model call failed: {e}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            Self::TimedOut => f.write_str("model call timed out"),
            Self::Cancelled => f.write_str("worker pool closed before the call started"),
        }
    }
}

/// Outcome of classifying one record.
#[derive(Debug)]
pub enum ClassifyOutcome {
    Classified(ClassificationResult),
    Skipped(SkipReason),
}

/// Sends records to the model and validates the answers.
///
/// Never touches the result store.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn ModelClient>,
    schema: Value,
}

impl Classifier {
    #[must_use]
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            schema: classification_schema(),
        }
    }

    /// Classify one record. Failures are logged and returned as a skip.
    pub async fn classify(&self, record: &FeedbackRecord) -> ClassifyOutcome {
        let Some(alert_id) = record.id().filter(|_| record.is_eligible()) else {
            return ClassifyOutcome::Skipped(SkipReason::Ineligible);
        };

        let request = ModelRequest {
            system_instruction: CLASSIFY_SYSTEM_PROMPT.to_string(),
            prompt: classification_prompt(record),
            response_schema: self.schema.clone(),
        };

        tracing::debug!(alert_id, "classifying");
        let response = match self.model.invoke(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(alert_id, error = %e, "model call failed");
                return ClassifyOutcome::Skipped(SkipReason::Model(e));
            }
        };

        match parse_classification(alert_id, &response.text) {
            Ok(result) => {
                tracing::info!(
                    alert_id,
                    theme = %result.theme,
                    confidence = %result.confidence,
                    "classified"
                );
                ClassifyOutcome::Classified(result)
            }
            Err(msg) => {
                let preview: String = response.text.chars().take(200).collect();
                tracing::error!(alert_id, error = %msg, response = %preview, "unparseable response");
                ClassifyOutcome::Skipped(SkipReason::InvalidResponse(msg))
            }
        }
    }
}

/// Turn the model's JSON text into a result for `alert_id`.
///
/// Out-of-set themes become `OTHER` with a warning; a missing confidence
/// becomes `UNKNOWN`; missing text fields become empty.
///
/// # Errors
///
/// Returns a description of the problem when the text is not a JSON object.
pub fn parse_classification(alert_id: &str, text: &str) -> Result<ClassificationResult, String> {
    let value: Value =
        serde_json::from_str(strip_code_fences(text)).map_err(|e| e.to_string())?;
    let Value::Object(fields) = value else {
        return Err(format!("expected a JSON object, got {}", kind(&value)));
    };

    let raw_theme = text_field(&fields, "theme");
    let (theme, coerced) = Theme::coerce(raw_theme);
    if coerced {
        tracing::warn!(
            alert_id,
            theme = raw_theme.unwrap_or_default(),
            "theme outside the taxonomy, using OTHER"
        );
    }

    Ok(ClassificationResult {
        alert_id: alert_id.to_string(),
        theme,
        confidence: text_field(&fields, "confidence")
            .unwrap_or(UNKNOWN_CONFIDENCE)
            .to_string(),
        reasoning: owned_field(&fields, "reasoning"),
        missing_context: owned_field(&fields, "missing_context"),
        trend_insight: owned_field(&fields, "trend_insight"),
        processed_at: Utc::now(),
    })
}

fn text_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

fn owned_field(fields: &Map<String, Value>, name: &str) -> String {
    text_field(fields, name).unwrap_or_default().to_string()
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
