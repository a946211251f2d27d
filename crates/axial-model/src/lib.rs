//! # axial-model
//!
//! Generative model client for Axial.
//!
//! The pipeline talks to the model through the [`ModelClient`] trait: one
//! structured-output request in, the raw JSON text out. [`GeminiClient`]
//! implements it over HTTP for Vertex AI and the Generative Language API,
//! retrying transient failures with backoff.

mod error;
mod gemini;
mod http;
mod retry;

pub use error::ModelError;
pub use gemini::GeminiClient;
pub use retry::{RetryConfig, with_retry};

use async_trait::async_trait;

/// One structured-output generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Role and rules for the model.
    pub system_instruction: String,
    /// The per-item prompt.
    pub prompt: String,
    /// Schema the JSON answer must follow (Gemini `responseSchema` dialect).
    pub response_schema: serde_json::Value,
}

/// Raw text returned by the model, expected to hold a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
}

/// A generative model that answers with JSON text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and return the model's text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on transport, API or envelope failures.
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).invoke(request).await
    }
}
