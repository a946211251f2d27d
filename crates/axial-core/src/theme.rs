//! The closed theme taxonomy.
//!
//! Every persisted classification carries exactly one of these six labels.
//! Labels returned by the model that fall outside the set are coerced to
//! [`Theme::Other`] by [`Theme::coerce`]; they are never dropped.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Root-cause theme for a piece of analyst feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    /// Activity by authorized internal users or teams doing their jobs.
    AuthorizedUserActivity,
    /// Different verdicts for the same or similar detections.
    AiVerdictInconsistency,
    /// Known-good software the analyst recognizes.
    LegitimateSoftware,
    /// Risk tolerance and escalation policy, independent of entities.
    OrganizationalPolicy,
    /// No evidence supporting the verdict or severity.
    InsufficientEvidence,
    /// Anything that does not clearly fit the above.
    Other,
}

impl Theme {
    /// All labels, in taxonomy order.
    pub const ALL: [Self; 6] = [
        Self::AuthorizedUserActivity,
        Self::AiVerdictInconsistency,
        Self::LegitimateSoftware,
        Self::OrganizationalPolicy,
        Self::InsufficientEvidence,
        Self::Other,
    ];

    /// Wire label, as used in prompts, model responses and the output file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizedUserActivity => "AUTHORIZED_USER_ACTIVITY",
            Self::AiVerdictInconsistency => "AI_VERDICT_INCONSISTENCY",
            Self::LegitimateSoftware => "LEGITIMATE_SOFTWARE",
            Self::OrganizationalPolicy => "ORGANIZATIONAL_POLICY",
            Self::InsufficientEvidence => "INSUFFICIENT_EVIDENCE",
            Self::Other => "OTHER",
        }
    }

    /// Map a raw model label onto the taxonomy.
    ///
    /// Returns the theme and whether the label had to be coerced. Matching is
    /// exact; anything else (including a missing label) becomes `OTHER`.
    #[must_use]
    pub fn coerce(raw: Option<&str>) -> (Self, bool) {
        match raw {
            None => (Self::Other, false),
            Some(label) => label.parse().map_or((Self::Other, true), |theme| (theme, false)),
        }
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTheme(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
