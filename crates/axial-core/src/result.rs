//! Classification results as persisted, one per line, in the output file.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Confidence reported when the model omits it.
pub const UNKNOWN_CONFIDENCE: &str = "UNKNOWN";

/// The classification of one feedback record.
///
/// Created once on a successful model response and never mutated afterwards.
/// `alert_id` is unique across the output file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClassificationResult {
    pub alert_id: String,

    pub theme: Theme,

    /// `HIGH`, `MEDIUM` or `LOW` as reported by the model; not validated.
    pub confidence: String,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub missing_context: String,

    #[serde(default)]
    pub trend_insight: String,

    pub processed_at: DateTime<Utc>,
}
