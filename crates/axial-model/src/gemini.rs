//! Gemini `generateContent` client for Vertex AI and the Generative Language API.

use std::time::Duration;

use async_trait::async_trait;
use axial_config::{ModelBackend, ModelConfig};
use serde::{Deserialize, Serialize};

use crate::{
    ModelClient, ModelRequest, ModelResponse,
    error::ModelError,
    http::check_response,
    retry::{RetryConfig, with_retry},
};

const GENERATIVE_LANGUAGE_BASE: &str = "https://generativelanguage.googleapis.com";

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    system_instruction: RequestContent<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> GenerateRequest<'a> {
    fn new(request: &'a ModelRequest, temperature: Option<f32>) -> Self {
        Self {
            contents: [RequestContent {
                role: Some("user"),
                parts: [RequestPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: RequestContent {
                role: None,
                parts: [RequestPart {
                    text: &request.system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
                temperature,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated answer text of the first candidate.
    fn into_text(self) -> Result<String, ModelError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ModelError::EmptyResponse {
                finish_reason: block_reason.unwrap_or_else(|| "NO_CANDIDATES".into()),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse {
                finish_reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "UNSPECIFIED".into()),
            });
        }
        Ok(text)
    }
}

// ── Client ─────────────────────────────────────────────────────────

#[derive(Clone)]
enum Auth {
    ApiKey(String),
    Bearer(String),
}

/// HTTP client for Gemini structured generation.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    auth: Auth,
    temperature: Option<f32>,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from resolved model configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] when no credentials are configured, or
    /// [`ModelError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let backend = config.backend()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("axial/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let auth = match &backend {
            ModelBackend::GenerativeLanguage { api_key } => Auth::ApiKey(api_key.clone()),
            ModelBackend::VertexAi { access_token, .. } => Auth::Bearer(access_token.clone()),
        };

        Ok(Self {
            http,
            url: endpoint_url(config, &backend),
            auth,
            temperature: config.temperature,
            retry: RetryConfig::with_max_attempts(config.max_attempts),
        })
    }

    /// The `generateContent` URL requests are posted to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, body: &GenerateRequest<'_>) -> Result<ModelResponse, ModelError> {
        let builder = self.http.post(&self.url).json(body);
        let builder = match &self.auth {
            Auth::ApiKey(key) => builder.header("x-goog-api-key", key),
            Auth::Bearer(token) => builder.bearer_auth(token),
        };
        let resp = check_response(builder.send().await?).await?;

        let bytes = resp.bytes().await?;
        let data: GenerateResponse =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse(e.to_string()))?;
        Ok(ModelResponse {
            text: data.into_text()?,
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let body = GenerateRequest::new(request, self.temperature);
        let body = &body;
        with_retry(&self.retry, move || self.send(body)).await
    }
}

fn endpoint_url(config: &ModelConfig, backend: &ModelBackend) -> String {
    let custom = config.endpoint.trim_end_matches('/');
    match backend {
        ModelBackend::GenerativeLanguage { .. } => {
            let base = if custom.is_empty() {
                GENERATIVE_LANGUAGE_BASE
            } else {
                custom
            };
            format!("{base}/v1beta/models/{}:generateContent", config.name)
        }
        ModelBackend::VertexAi {
            project, location, ..
        } => {
            let base = if !custom.is_empty() {
                custom.to_string()
            } else if location == "global" {
                "https://aiplatform.googleapis.com".to_string()
            } else {
                format!("https://{location}-aiplatform.googleapis.com")
            };
            format!(
                "{base}/v1/projects/{project}/locations/{location}/publishers/google/models/{}:generateContent",
                config.name
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const FIXTURE: &str = r#"{
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "{\"theme\": \"AUTHORIZED_USER_ACTIVITY\", "},
                        {"text": "\"confidence\": \"HIGH\"}"}
                    ]
                },
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": {"promptTokenCount": 812, "candidatesTokenCount": 64}
    }"#;

    fn vertex_config() -> ModelConfig {
        ModelConfig {
            project: "sec-ops".into(),
            access_token: "ya29.token".into(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_generate_response() {
        let data: GenerateResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(
            data.into_text().unwrap(),
            r#"{"theme": "AUTHORIZED_USER_ACTIVITY", "confidence": "HIGH"}"#
        );
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let data: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = data.into_text().unwrap_err();
        assert!(matches!(
            err,
            ModelError::EmptyResponse { ref finish_reason } if finish_reason == "SAFETY"
        ));
    }

    #[test]
    fn thought_parts_are_dropped() {
        let data: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "considering the comment", "thought": true},
                {"text": "{}"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(data.into_text().unwrap(), "{}");
    }

    #[test]
    fn max_tokens_without_text_is_empty_response() {
        let data: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert!(matches!(
            data.into_text(),
            Err(ModelError::EmptyResponse { finish_reason }) if finish_reason == "MAX_TOKENS"
        ));
    }

    #[test]
    fn request_body_shape() {
        let request = ModelRequest {
            system_instruction: "You are an analyst.".into(),
            prompt: "Classify this.".into(),
            response_schema: json!({"type": "OBJECT"}),
        };
        let body = serde_json::to_value(GenerateRequest::new(&request, Some(0.2))).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "Classify this."}]}],
                "systemInstruction": {"parts": [{"text": "You are an analyst."}]},
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"},
                    "temperature": 0.2
                }
            })
        );
    }

    #[test]
    fn vertex_url() {
        let client = GeminiClient::from_config(&vertex_config()).unwrap();
        assert_eq!(
            client.url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/sec-ops/locations/us-central1/publishers/google/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn vertex_global_location_url() {
        let config = ModelConfig {
            location: "global".into(),
            ..vertex_config()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert!(
            client
                .url()
                .starts_with("https://aiplatform.googleapis.com/v1/projects/sec-ops/locations/global/")
        );
    }

    #[test]
    fn api_key_url_and_endpoint_override() {
        let config = ModelConfig {
            api_key: "key".into(),
            endpoint: "http://localhost:8080/".into(),
            ..Default::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.url(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn missing_credentials_fail_to_build() {
        let err = GeminiClient::from_config(&ModelConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }
}
