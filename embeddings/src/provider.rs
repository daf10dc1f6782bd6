//! Embedding provider.
//!
//! Wraps a [`TextEncoder`] with one-time initialization and turns token-level
//! encoder output into unit-normalized sentence embeddings.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::Embedding;
use crate::encoder::TextEncoder;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{mean_pool, normalize};

/// Provider that produces normalized embeddings from a wrapped encoder.
///
/// Initialization happens exactly once: concurrent callers of
/// [`initialize`](EmbeddingProvider::initialize) await the same in-flight load
/// rather than triggering duplicate loads. A failed load leaves the provider
/// uninitialized, so the next explicit `initialize` call retries.
pub struct EmbeddingProvider {
    encoder: Arc<dyn TextEncoder>,
    ready: OnceCell<()>,
}

impl EmbeddingProvider {
    /// Create a new provider around an encoder.
    pub fn new(encoder: Arc<dyn TextEncoder>) -> Self {
        Self {
            encoder,
            ready: OnceCell::new(),
        }
    }

    /// Get the name of the wrapped encoder.
    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    /// Get the embedding dimension.
    pub fn dimension(&self) -> usize {
        self.encoder.dimension()
    }

    /// Check whether initialization has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Load the model, once.
    pub async fn initialize(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                info!("Loading embedding model: {}", self.encoder.name());
                self.encoder.load().await
            })
            .await?;
        Ok(())
    }

    /// Generate a mean-pooled, L2-normalized embedding for one text.
    ///
    /// Fails with [`EmbeddingError::ModelNotReady`] before a successful
    /// [`initialize`](EmbeddingProvider::initialize).
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        if !self.is_ready() {
            return Err(EmbeddingError::ModelNotReady);
        }

        let rows = self.encoder.encode(text).await?;
        let mut pooled = mean_pool(&rows)?;

        if pooled.len() != self.encoder.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.encoder.dimension(),
                actual: pooled.len(),
            });
        }

        normalize(&mut pooled);
        debug!("Embedded text into {} dimensions", pooled.len());

        Ok(pooled)
    }

    /// Generate embeddings for multiple texts, preserving input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
