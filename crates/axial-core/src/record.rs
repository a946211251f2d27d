//! Feedback records as produced by the trace-fetch step.
//!
//! The input document is a JSON array of loosely-shaped objects. Fields that
//! upstream sometimes fills with `null`, numbers or nested objects are read
//! leniently: anything that is not a string is treated as absent, so one odd
//! record never makes the whole input unreadable. The analyst comment is the
//! exception: a non-empty value of the wrong type still counts as a comment
//! (an unusable one), so it never triggers the feedback-score fallback.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::assessment::PriorAssessment;
use crate::errors::CoreError;

/// A comment must be strictly longer than this many characters (after trimming)
/// to be worth classifying.
pub const MIN_COMMENT_CHARS: usize = 10;

/// Tenant label used when the record carries no account name.
pub const UNKNOWN_TENANT: &str = "Unknown";

/// Placeholder for missing prompt fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// One analyst review of one alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub alert_id: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub feedback_scores: Vec<FeedbackScore>,

    #[serde(default)]
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub human_comment: Option<Value>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub account_short_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub verdict: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub triage_confirmation: Option<String>,
}

/// A feedback score attached to the trace. Some analysts leave their comment
/// here instead of in `metadata.human_comment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackScore {
    #[serde(default)]
    pub comment: Option<Value>,

    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// One span of an upstream trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default)]
    pub output: Option<Value>,
}

impl Observation {
    /// Whether this observation is an upstream model call.
    #[must_use]
    pub fn is_generation(&self) -> bool {
        self.kind.as_deref() == Some("GENERATION") || self.name.as_deref() == Some("llm:generate")
    }

    /// Textual payload of the generation output.
    ///
    /// `output.content` when `output` is an object, or `output` itself when it
    /// is a bare string.
    #[must_use]
    pub fn output_text(&self) -> Option<&str> {
        match self.output.as_ref()? {
            Value::String(text) => Some(text),
            Value::Object(map) => map.get("content").and_then(Value::as_str),
            _ => None,
        }
    }

    fn has_output(&self) -> bool {
        match &self.output {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

impl FeedbackScore {
    fn qualifying_comment(&self) -> Option<&str> {
        [&self.comment, &self.value]
            .into_iter()
            .filter_map(|field| field.as_ref().and_then(Value::as_str))
            .find(|text| is_meaningful(text))
    }
}

impl FeedbackRecord {
    /// Decode the input document (a JSON array of records).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the document is not a JSON array
    /// of objects.
    pub fn parse_many(json: &str) -> Result<Vec<Self>, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Identifier, if the record has a non-empty one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.alert_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The comment worth classifying, if any.
    ///
    /// Uses `metadata.human_comment` when it is non-empty. Otherwise the first
    /// feedback score whose `comment` or `value` is a meaningful string wins.
    /// Returns `None` if the resulting comment is too short or the primary
    /// comment is set to something other than a string.
    #[must_use]
    pub fn effective_comment(&self) -> Option<&str> {
        let comment = match self.metadata.human_comment.as_ref() {
            Some(primary) if is_set(primary) => primary.as_str()?,
            _ => self
                .feedback_scores
                .iter()
                .find_map(FeedbackScore::qualifying_comment)?,
        };
        is_meaningful(comment).then_some(comment)
    }

    /// Whether the record should be sent to the model at all.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.id().is_some() && self.effective_comment().is_some()
    }

    #[must_use]
    pub fn tenant(&self) -> &str {
        self.metadata
            .account_short_name
            .as_deref()
            .unwrap_or(UNKNOWN_TENANT)
    }

    #[must_use]
    pub fn verdict(&self) -> &str {
        self.metadata.verdict.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    #[must_use]
    pub fn confirmation_status(&self) -> &str {
        self.metadata
            .triage_confirmation
            .as_deref()
            .unwrap_or(NOT_AVAILABLE)
    }

    /// The first generation observation of the first trace that has output.
    #[must_use]
    pub fn generation_observation(&self) -> Option<&Observation> {
        self.traces
            .first()?
            .observations
            .iter()
            .find(|obs| obs.is_generation() && obs.has_output())
    }

    /// Prior automated assessment, with `N/A` defaults for anything missing.
    #[must_use]
    pub fn prior_assessment(&self) -> PriorAssessment {
        self.generation_observation()
            .and_then(Observation::output_text)
            .map(PriorAssessment::from_generation_text)
            .unwrap_or_default()
    }
}

/// Trimmed length strictly above [`MIN_COMMENT_CHARS`].
#[must_use]
pub fn is_meaningful(text: &str) -> bool {
    text.trim().chars().count() > MIN_COMMENT_CHARS
}

/// Non-null and non-empty: `false`, `0`, `""`, `[]` and `{}` are all unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
