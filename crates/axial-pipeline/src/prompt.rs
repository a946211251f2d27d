//! Request contract for both model calls: instructions, per-item prompt and
//! the response schemas (Gemini `responseSchema` dialect).

use axial_core::{FeedbackRecord, PriorAssessment, Theme, TrendInsight};
use serde_json::{Value, json};

/// Instructions for classifying one piece of analyst feedback.
pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"You are a security operations analyst reviewing how human analysts responded to verdicts produced by an automated alert triage model.

Classify each feedback comment into exactly one theme and explain the classification.

## Themes

AUTHORIZED_USER_ACTIVITY
The flagged activity was performed by an internal user, team or account acting within its role: system administrators, IT, red team or offensive security, service or deployment accounts. Typical comments: "this is our offsec team", "known activity for user", "IT super user". The model lacked context about who the users are and what they normally do.

AI_VERDICT_INCONSISTENCY
The analyst points out that the model judged the same or a very similar detection differently elsewhere. Typical comments: "does not match previous detections", "other detections are marked as benign", "same as before". The model lacks memory of earlier verdicts.

LEGITIMATE_SOFTWARE
The flagged binary or process is known-good software: vendor utilities, internally developed tools, industry-specific applications, installers. Typical comments: "legitimate application/binary", "this is a clipboard utility", "belongs to Lenovo Vantage". The model lacked knowledge of the software estate.

ORGANIZATIONAL_POLICY
The analyst wants a stricter or different handling than the technical threat level suggests, because of policy, intent or visibility requirements. Typical comments: "should still be treated as malicious even though it was blocked", "the team should still have visibility". The model underweights policy over technical impact.

INSUFFICIENT_EVIDENCE
The analyst finds nothing that supports the model's verdict or severity. Typical comments: "no indication of suspicious activity", "no observables added to this alert". The model relied on a single weak signal.

OTHER
Anything that does not clearly fit above: ambiguous or very short comments, workflow or process remarks, comments without enough context.

## Instructions

1. Read the analyst comment first; it carries the most weight.
2. Use the model's verdict, justification, event summary and investigative gaps as supporting context.
3. Pick the single best matching theme.
4. Explain which indicators led to the choice, what context the model was missing, and any remaining uncertainty.
5. Summarize in one sentence the recurring pattern this item is an instance of, for cross-alert trend analysis.

Answer with a JSON object holding: theme (one of the six labels above, exactly as written), confidence (HIGH, MEDIUM or LOW), reasoning, missing_context and trend_insight."#;

/// Instructions for the cross-item trend analysis.
pub const TRENDS_SYSTEM_PROMPT: &str = r#"You are a security operations lead reviewing the classified feedback analysts left on automated alert verdicts.

Each input item carries the theme assigned to one piece of feedback, a one-sentence insight describing the pattern behind it, and the tenant it came from.

Identify the most significant recurring trends across all items. For each trend give a short title, a description of the pattern and its impact, the affected tenants, a severity (HIGH, MEDIUM or LOW) reflecting how much analyst effort or risk it causes, and a concrete recommendation for improving the triage model or its context.

Order trends by severity, then by how many items they cover. Finish with a short overall summary of what the feedback says about the triage model."#;

/// Render the per-item prompt from a record's fields.
#[must_use]
pub fn classification_prompt(record: &FeedbackRecord) -> String {
    format_classification_prompt(
        record.id().unwrap_or_default(),
        record.tenant(),
        record.effective_comment().unwrap_or_default(),
        record.verdict(),
        record.confirmation_status(),
        &record.prior_assessment(),
    )
}

fn format_classification_prompt(
    alert_id: &str,
    tenant: &str,
    comment: &str,
    verdict: &str,
    confirmation: &str,
    prior: &PriorAssessment,
) -> String {
    format!(
        "Classify the following analyst feedback into one of the themes.\n\
         \n\
         ## Alert\n\
         Alert ID: {alert_id}\n\
         Tenant: {tenant}\n\
         Analyst verdict: {verdict}\n\
         Confirmation status: {confirmation}\n\
         \n\
         ## Analyst comment\n\
         {comment}\n\
         \n\
         ## Automated assessment\n\
         Verdict: {}\n\
         Justification: {}\n\
         Event summary: {}\n\
         Investigative gaps: {}\n\
         \n\
         Respond with JSON only.",
        prior.decision, prior.justification, prior.event_summary, prior.investigative_gaps,
    )
}

/// Render the trend-analysis prompt over compacted results.
#[must_use]
pub fn trends_prompt(insights: &[TrendInsight]) -> String {
    format!(
        "Analyze these {} classification insights:\n\n{}",
        insights.len(),
        serde_json::to_string_pretty(insights).unwrap_or_default()
    )
}

/// Response schema for a single classification.
#[must_use]
pub fn classification_schema() -> Value {
    let labels: Vec<&str> = Theme::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "theme": {"type": "STRING", "enum": labels},
            "confidence": {"type": "STRING"},
            "reasoning": {"type": "STRING"},
            "missing_context": {"type": "STRING"},
            "trend_insight": {"type": "STRING"}
        },
        "required": ["theme", "confidence", "reasoning", "trend_insight"]
    })
}

/// Response schema for the trend summary.
#[must_use]
pub fn trends_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "trends": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": {"type": "STRING"},
                        "description": {"type": "STRING"},
                        "affected_tenants": {"type": "ARRAY", "items": {"type": "STRING"}},
                        "severity": {"type": "STRING"},
                        "recommendation": {"type": "STRING"}
                    },
                    "required": ["title", "description", "severity"]
                }
            },
            "summary": {"type": "STRING"}
        },
        "required": ["trends", "summary"]
    })
}
