//! Text encoders.
//!
//! A [`TextEncoder`] is the externally supplied embedding model. It produces
//! token-level vectors; pooling and normalization are the provider's job, so
//! encoders that pool server-side simply return a single row.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for text-embedding models.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Get the name of this encoder.
    fn name(&self) -> &str;

    /// Get the dimension of produced vectors.
    fn dimension(&self) -> usize;

    /// Load or validate the model. Called once before any [`encode`] call.
    ///
    /// [`encode`]: TextEncoder::encode
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Encode a text into token-level vectors, one row per token.
    ///
    /// Encoders that pool internally return a single row.
    async fn encode(&self, text: &str) -> Result<Vec<Embedding>>;
}

/// Encoder backed by an OpenAI-compatible embeddings API.
///
/// The API returns sentence-level vectors, so [`encode`] yields one row.
///
/// [`encode`]: TextEncoder::encode
pub struct RemoteEncoder {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model name.
    model: String,

    /// Output dimension for the model.
    dimension: usize,
}

impl RemoteEncoder {
    /// Create a new remote encoder reading the API key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model and its output dimension.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.dimension = match self.model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => self.dimension,
        };
        self
    }

    /// Override the output dimension (for models not in the built-in table).
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Check if the encoder has an API key configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for RemoteEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextEncoder for RemoteEncoder {
    fn name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn load(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(EmbeddingError::NotConfigured);
        }
        info!("Remote encoder ready with model: {}", self.model);
        Ok(())
    }

    async fn encode(&self, text: &str) -> Result<Vec<Embedding>> {
        let api_key = self.api_key.as_ref().ok_or(EmbeddingError::NotConfigured)?;

        debug!("Requesting embedding with model: {}", self.model);

        let body = serde_json::json!({
            "input": text,
            "model": self.model
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Inference(format!(
                "API error: {error_text}"
            )));
        }

        let result: ApiEmbeddingResponse = response.json().await?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?
            .embedding;

        debug!("Received embedding with {} dimensions", embedding.len());

        Ok(vec![embedding])
    }
}

/// OpenAI-compatible API response format.
#[derive(Debug, Deserialize)]
struct ApiEmbeddingResponse {
    data: Vec<ApiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct ApiEmbeddingData {
    embedding: Vec<f32>,
}
