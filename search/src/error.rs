//! Error types for the search coordination engine.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur in the search coordination engine.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Embedding error (model load or inference).
    #[error("embedding error: {0}")]
    Embedding(#[from] typeahead_embeddings::EmbeddingError),

    /// Unrecognized or malformed protocol message.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The worker task is gone and can no longer accept commands.
    #[error("inference worker closed")]
    WorkerClosed,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
