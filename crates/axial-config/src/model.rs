//! Generative model backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_name() -> String {
    String::from("gemini-2.5-flash")
}

fn default_location() -> String {
    String::from("us-central1")
}

/// Default per-call timeout in seconds.
const fn default_timeout_secs() -> u64 {
    120
}

/// Default attempts per model call (including the first one).
const fn default_max_attempts() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Model name (e.g., `gemini-2.5-flash`).
    #[serde(default = "default_name")]
    pub name: String,

    /// GCP project ID for Vertex AI.
    #[serde(default)]
    pub project: String,

    /// GCP location for Vertex AI.
    #[serde(default = "default_location")]
    pub location: String,

    /// Generative Language API key. Takes precedence over Vertex AI when set.
    #[serde(default)]
    pub api_key: String,

    /// OAuth access token for Vertex AI (e.g., `gcloud auth print-access-token`).
    #[serde(default)]
    pub access_token: String,

    /// Override for the API base URL (proxies, emulators).
    #[serde(default)]
    pub endpoint: String,

    /// Per-call timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per call before the item is skipped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sampling temperature; the model default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            project: String::new(),
            location: default_location(),
            api_key: String::new(),
            access_token: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            temperature: None,
        }
    }
}

/// Where and how model requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelBackend {
    /// Public Generative Language API, authenticated with an API key.
    GenerativeLanguage { api_key: String },
    /// Vertex AI, authenticated with a bearer token.
    VertexAi {
        project: String,
        location: String,
        access_token: String,
    },
}

impl ModelConfig {
    /// Check if the model config carries usable credentials.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend().is_ok()
    }

    /// Resolve the credentials context.
    ///
    /// An API key selects the Generative Language API. Otherwise both a project
    /// and an access token are required for Vertex AI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when neither is available.
    pub fn backend(&self) -> Result<ModelBackend, ConfigError> {
        if !self.api_key.is_empty() {
            return Ok(ModelBackend::GenerativeLanguage {
                api_key: self.api_key.clone(),
            });
        }
        if self.project.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "model".into(),
                hint: "set --project / GOOGLE_CLOUD_PROJECT, or an API key via GEMINI_API_KEY"
                    .into(),
            });
        }
        if self.access_token.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "model".into(),
                hint: "Vertex AI needs an access token: set GOOGLE_CLOUD_ACCESS_TOKEN or AXIAL_MODEL__ACCESS_TOKEN"
                    .into(),
            });
        }
        Ok(ModelBackend::VertexAi {
            project: self.project.clone(),
            location: self.location.clone(),
            access_token: self.access_token.clone(),
        })
    }

    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero timeout or attempt count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "model.name".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
