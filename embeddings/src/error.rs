//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The model has not finished loading.
    #[error("model not ready: call initialize() first")]
    ModelNotReady,

    /// Model initialization failed.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// Embedding generation failed at runtime.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Encoder not configured.
    #[error("encoder not configured")]
    NotConfigured,

    /// Invalid response from an encoder backend.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
