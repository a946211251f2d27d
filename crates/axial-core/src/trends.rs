//! Cross-cutting trend analysis over all classification results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Summary text used when trend generation fails.
pub const FALLBACK_SUMMARY: &str = "Error generating trends.";

/// The aggregate written to `global_trends.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrendSummary {
    pub trends: Vec<TrendEntry>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrendEntry {
    pub title: String,
    pub description: String,
    pub severity: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_tenants: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl TrendSummary {
    /// Degraded but valid summary returned when the model call fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            trends: Vec::new(),
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.trends.is_empty() && self.summary == FALLBACK_SUMMARY
    }
}

/// Compact per-result view sent to the model for trend analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendInsight {
    pub theme: Theme,
    pub insight: String,
    pub tenant: String,
}
