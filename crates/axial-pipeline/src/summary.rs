//! Offline distribution of stored results. No model call involved.

use std::collections::{BTreeMap, HashMap};

use axial_core::record::UNKNOWN_TENANT;
use axial_core::{ClassificationResult, Theme};
use serde::Serialize;

/// Counts per theme, confidence and tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub total: usize,
    /// Every theme is present, zero counts included.
    pub by_theme: BTreeMap<Theme, usize>,
    pub by_confidence: BTreeMap<String, usize>,
    pub by_tenant: BTreeMap<String, usize>,
}

impl ResultsSummary {
    /// Tally `results`, resolving tenants through `tenants` (default `Unknown`).
    #[must_use]
    pub fn from_results(
        results: &[ClassificationResult],
        tenants: &HashMap<String, String>,
    ) -> Self {
        let mut by_theme: BTreeMap<Theme, usize> = Theme::ALL.into_iter().map(|t| (t, 0)).collect();
        let mut by_confidence = BTreeMap::new();
        let mut by_tenant = BTreeMap::new();

        for result in results {
            *by_theme.entry(result.theme).or_default() += 1;
            *by_confidence.entry(result.confidence.clone()).or_default() += 1;
            let tenant = tenants
                .get(&result.alert_id)
                .map_or(UNKNOWN_TENANT, String::as_str);
            *by_tenant.entry(tenant.to_string()).or_default() += 1;
        }

        Self {
            total: results.len(),
            by_theme,
            by_confidence,
            by_tenant,
        }
    }

    /// Themes ordered by count, most frequent first.
    #[must_use]
    pub fn ranked_themes(&self) -> Vec<(Theme, usize)> {
        let mut ranked: Vec<_> = self.by_theme.iter().map(|(t, n)| (*t, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn result(id: &str, theme: Theme, confidence: &str) -> ClassificationResult {
        ClassificationResult {
            alert_id: id.into(),
            theme,
            confidence: confidence.into(),
            reasoning: String::new(),
            missing_context: String::new(),
            trend_insight: String::new(),
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn tallies_all_dimensions() {
        let results = vec![
            result("a1", Theme::AuthorizedUserActivity, "HIGH"),
            result("a2", Theme::AuthorizedUserActivity, "MEDIUM"),
            result("a3", Theme::LegitimateSoftware, "HIGH"),
        ];
        let tenants = HashMap::from([
            ("a1".to_string(), "acme".to_string()),
            ("a3".to_string(), "acme".to_string()),
        ]);
        let summary = ResultsSummary::from_results(&results, &tenants);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_theme.len(), 6);
        assert_eq!(summary.by_theme[&Theme::AuthorizedUserActivity], 2);
        assert_eq!(summary.by_theme[&Theme::Other], 0);
        assert_eq!(summary.by_confidence["HIGH"], 2);
        assert_eq!(summary.by_tenant["acme"], 2);
        assert_eq!(summary.by_tenant["Unknown"], 1);
        assert_eq!(
            summary.ranked_themes()[0],
            (Theme::AuthorizedUserActivity, 2)
        );
    }

    #[test]
    fn serializes_theme_keys_as_labels() {
        let summary = ResultsSummary::from_results(&[], &HashMap::new());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["by_theme"]["INSUFFICIENT_EVIDENCE"], 0);
        assert_eq!(json["total"], 0);
    }
}
