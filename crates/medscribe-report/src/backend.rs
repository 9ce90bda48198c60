//! Report generation backend boundary
//!
//! The generation service talks to a [`ReportBackend`], not to a
//! concrete transport. The HTTP implementation posts a chat-completions
//! request and maps upstream statuses onto the user-facing error
//! classes: rate-limit is retryable, quota exhaustion is not, anything
//! else is a generic failure.

use async_trait::async_trait;
use tracing::{debug, error};

use medscribe_foundation::GenerationError;

use crate::prompt;
use crate::request::ReportRequest;

#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// Produce the model's raw text reply for one request
    async fn generate(&self, request: &ReportRequest) -> Result<String, GenerationError>;
}

/// HTTP backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Bearer token
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: "google/gemini-3-flash-preview".to_string(),
            temperature: 0.3,
        }
    }
}

/// Chat-completions HTTP backend
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ReportBackend for HttpBackend {
    async fn generate(&self, request: &ReportRequest) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": prompt::user_message(request) },
            ],
            "temperature": self.config.temperature,
        });

        debug!(target: "report", "posting generation request ({} transcript chars)", request.transcript.len());

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(target: "report", "AI gateway error {status}: {detail}");
            return Err(match status.as_u16() {
                429 => GenerationError::RateLimited,
                402 => GenerationError::QuotaExceeded,
                _ => GenerationError::Upstream(format!("gateway returned {status}")),
            });
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        reply
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|c| c.to_string())
            .ok_or_else(|| GenerationError::Upstream("Invalid AI response".to_string()))
    }
}
