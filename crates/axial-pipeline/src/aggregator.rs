//! Cross-cutting trend analysis over all stored results.

use std::collections::HashMap;
use std::sync::Arc;

use axial_core::assessment::strip_code_fences;
use axial_core::record::UNKNOWN_TENANT;
use axial_core::{ClassificationResult, FeedbackRecord, TrendInsight, TrendSummary};
use axial_model::{ModelClient, ModelRequest};

use crate::error::PipelineError;
use crate::prompt::{TRENDS_SYSTEM_PROMPT, trends_prompt, trends_schema};

/// Map alert ids to tenant names. Records without an id are ignored.
#[must_use]
pub fn tenant_map(records: &[FeedbackRecord]) -> HashMap<String, String> {
    records
        .iter()
        .filter_map(|r| Some((r.id()?.to_string(), r.tenant().to_string())))
        .collect()
}

/// Compress results into the per-item view sent for trend analysis.
#[must_use]
pub fn compact(
    results: &[ClassificationResult],
    tenants: &HashMap<String, String>,
) -> Vec<TrendInsight> {
    results
        .iter()
        .map(|r| TrendInsight {
            theme: r.theme,
            insight: r.trend_insight.clone(),
            tenant: tenants
                .get(&r.alert_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TENANT.to_string()),
        })
        .collect()
}

/// Produces the global trend summary from classification results.
#[derive(Clone)]
pub struct Aggregator {
    model: Arc<dyn ModelClient>,
}

impl Aggregator {
    #[must_use]
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Summarize `results`, falling back to an empty summary on any failure.
    pub async fn summarize(
        &self,
        results: &[ClassificationResult],
        tenants: &HashMap<String, String>,
    ) -> TrendSummary {
        tracing::info!(results = results.len(), "generating global trend analysis");
        match self.try_summarize(results, tenants).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "trend generation failed");
                TrendSummary::fallback()
            }
        }
    }

    /// Like [`Self::summarize`], but surfaces the failure.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the model call fails or the answer does
    /// not match the trend summary shape.
    pub async fn try_summarize(
        &self,
        results: &[ClassificationResult],
        tenants: &HashMap<String, String>,
    ) -> Result<TrendSummary, PipelineError> {
        let request = ModelRequest {
            system_instruction: TRENDS_SYSTEM_PROMPT.to_string(),
            prompt: trends_prompt(&compact(results, tenants)),
            response_schema: trends_schema(),
        };
        let response = self.model.invoke(&request).await?;
        serde_json::from_str(strip_code_fences(&response.text))
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))
    }
}
