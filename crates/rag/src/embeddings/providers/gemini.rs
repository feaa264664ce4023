//! Gemini embedding provider.
//!
//! Calls the Generative Language API batchEmbedContents endpoint.
//! API: https://ai.google.dev/api/embeddings

use crate::embeddings::provider::EmbeddingProvider;
use hackrx_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default API endpoint for the Generative Language API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbedValues>,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

/// Gemini embedding client.
#[derive(Debug)]
pub struct GeminiEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    /// Create a new embedder against the default endpoint.
    ///
    /// `model` is the full resource name, e.g. "models/embedding-001".
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_ENDPOINT)
    }

    /// Create a new embedder with a custom base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Embedding batch of {} texts", texts.len());

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: self.model.clone(),
                    content: EmbedContent {
                        parts: vec![EmbedPart { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let url = format!("{}/{}:batchEmbedContents", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Transport(format!("Failed to send embedding request: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RateLimited(format!(
                "Embedding API throttled the request: {}",
                error_text
            )));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let batch: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse embedding response: {}", e)))?;

        if batch.embeddings.len() != texts.len() {
            return Err(AppError::Index(format!(
                "Embedding API returned {} vectors for {} texts",
                batch.embeddings.len(),
                texts.len()
            )));
        }

        Ok(batch.embeddings.into_iter().map(|e| e.values).collect())
    }
}
