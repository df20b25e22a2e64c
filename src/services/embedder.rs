use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::EMBEDDING_DIM;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Retrieval mode passed to the embedding model. Queries and stored
/// documents are embedded differently by `text-embedding-004`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    Query,
    Document,
}

impl EmbeddingTask {
    fn as_str(self) -> &'static str {
        match self {
            EmbeddingTask::Query => "RETRIEVAL_QUERY",
            EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
        }
    }
}

/// Maps text to a fixed-length vector. Implemented by the Gemini client in
/// production and by counting fakes in tests.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/models/{}:embedContent",
            config.gemini_base_url.trim_end_matches('/'),
            config.embed_model
        );

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            endpoint,
            model: config.embed_model.clone(),
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
    #[serde(rename = "taskType")]
    task_type: &'static str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: task.as_str(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => ApiError::Embedding(
                    "Authentication failed. Check your Gemini API key.".to_string(),
                ),
                404 => ApiError::Embedding(format!(
                    "Embedding model not found: {}. Check the model name.",
                    self.model
                )),
                429 => ApiError::Embedding(
                    "Rate limit exceeded on the embedding API.".to_string(),
                ),
                _ => ApiError::Embedding(format!(
                    "Embedding API returned non-success status: {} - {}",
                    status, body
                )),
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Embedding(format!("Failed to parse response: {}", e)))?;

        let values = parsed.embedding.values;
        if values.is_empty() {
            return Err(ApiError::Embedding(
                "Embedding API returned no vector".to_string(),
            ));
        }
        if values.len() != EMBEDDING_DIM {
            return Err(ApiError::Embedding(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                EMBEDDING_DIM,
                values.len()
            )));
        }

        debug!("Embedded {} chars as {} dims", text.len(), values.len());
        Ok(values)
    }
}
