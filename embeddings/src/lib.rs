//! # Embeddings
//!
//! This crate provides embedding generation and similarity ranking for the
//! typeahead search engine.
//!
//! ## Features
//!
//! - **Encoder Seam**: The [`TextEncoder`] trait wraps an externally supplied
//!   text-embedding model
//! - **Provider**: Lazy one-time model initialization, mean-pooling, and
//!   L2 normalization
//! - **Ranking**: Pure cosine-similarity ranking with threshold filtering and
//!   top-K truncation
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  Embeddings System                     │
//! ├────────────────────────────────────────────────────────┤
//! │  TextEncoder ──► EmbeddingProvider ──► Embedding       │
//! │       │                                   │            │
//! │       ▼                                   ▼            │
//! │  Remote/Local                    rank + filter_and_sort│
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod encoder;
pub mod error;
pub mod provider;
pub mod similarity;

pub use encoder::{RemoteEncoder, TextEncoder};
pub use error::{EmbeddingError, Result};
pub use provider::EmbeddingProvider;
pub use similarity::{SimilarityResult, cosine_similarity, filter_and_sort, rank};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
