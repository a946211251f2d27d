//! Prior automated assessment carried in upstream trace data.
//!
//! The upstream triage model writes its verdict as JSON text into the output of
//! a generation observation. Extraction is a two-step normalization:
//!
//! 1. Decode: strip markdown code fences, parse JSON, and unwrap a top-level
//!    `properties` object if the model echoed its schema shape.
//! 2. Read fields through fallback chains, ending in `N/A`:
//!
//! | field                | chain                                           |
//! |----------------------|-------------------------------------------------|
//! | `decision`           | `final_decision` → `primary_assessment` → `N/A` |
//! | `justification`      | `justification` → `primary_summary` → `N/A`     |
//! | `event_summary`      | `event_summary` → `N/A`                         |
//! | `investigative_gaps` | list joined with `", "`, or a string → `N/A`    |
//!
//! Failure at any step yields the all-`N/A` default, never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::NOT_AVAILABLE;

const DECISION_FIELDS: &[&str] = &["final_decision", "primary_assessment"];
const JUSTIFICATION_FIELDS: &[&str] = &["justification", "primary_summary"];
const EVENT_SUMMARY_FIELDS: &[&str] = &["event_summary"];
const GAPS_FIELD: &str = "investigative_gaps";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAssessment {
    pub decision: String,
    pub justification: String,
    pub event_summary: String,
    pub investigative_gaps: String,
}

impl Default for PriorAssessment {
    fn default() -> Self {
        Self {
            decision: NOT_AVAILABLE.to_string(),
            justification: NOT_AVAILABLE.to_string(),
            event_summary: NOT_AVAILABLE.to_string(),
            investigative_gaps: NOT_AVAILABLE.to_string(),
        }
    }
}

impl PriorAssessment {
    /// Parse the textual payload of a generation observation.
    #[must_use]
    pub fn from_generation_text(text: &str) -> Self {
        let Ok(parsed) = serde_json::from_str::<Value>(strip_code_fences(text)) else {
            tracing::debug!("generation output is not JSON; using N/A defaults");
            return Self::default();
        };
        match unwrap_properties(parsed) {
            Value::Object(fields) => Self::from_fields(&fields),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            decision: first_string(fields, DECISION_FIELDS),
            justification: first_string(fields, JUSTIFICATION_FIELDS),
            event_summary: first_string(fields, EVENT_SUMMARY_FIELDS),
            investigative_gaps: join_gaps(fields.get(GAPS_FIELD)),
        }
    }
}

/// Remove a surrounding markdown code fence (```` ``` ```` or ```` ```json ````).
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) up to the first newline.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn unwrap_properties(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("properties") => {
            map.remove("properties").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn first_string(fields: &Map<String, Value>, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| fields.get(*name).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn join_gaps(value: Option<&Value>) -> String {
    let joined = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    };
    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}
