//! Background inference worker.
//!
//! The worker is an isolated task owning the embedding provider and the
//! corpus embeddings. It communicates exclusively through a pair of mpsc
//! channels: commands in, events out. One command is processed to completion
//! before the next is received, so responses are emitted in the same order
//! commands arrive. Every failure is converted into a [`WorkerEvent::Error`]
//! rather than tearing the task down.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use typeahead_embeddings::{Embedding, EmbeddingError, EmbeddingProvider, filter_and_sort, rank};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::protocol::{WorkerCommand, WorkerEvent};

/// Lifecycle of the worker's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    /// No load attempted, or the last load failed.
    Uninitialized,

    /// A load is in progress.
    Loading,

    /// The model is loaded and commands can be served.
    Ready,
}

/// The inference worker task state.
pub struct InferenceWorker {
    /// Embedding provider owning the model.
    provider: EmbeddingProvider,

    /// Corpus embeddings, index-aligned with the corpus. Computed once.
    corpus_embeddings: Option<Vec<Embedding>>,

    /// Model lifecycle state.
    state: WorkerState,

    /// Minimum similarity for a result.
    threshold: f32,

    /// Maximum results per query.
    top_k: usize,

    /// Outgoing event channel.
    events: mpsc::Sender<WorkerEvent>,
}

/// Handle for sending commands to a spawned worker.
#[derive(Clone)]
pub struct WorkerHandle {
    commands: mpsc::Sender<WorkerCommand>,
    events: mpsc::Sender<WorkerEvent>,
}

impl InferenceWorker {
    /// Spawn a worker task.
    ///
    /// Returns the command handle and the event receiver. The task exits when
    /// every handle is dropped.
    pub fn spawn(
        provider: EmbeddingProvider,
        config: &SearchConfig,
    ) -> (WorkerHandle, mpsc::Receiver<WorkerEvent>) {
        let (command_tx, mut command_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, event_rx) = mpsc::channel(config.command_buffer);

        let mut worker = Self {
            provider,
            corpus_embeddings: None,
            state: WorkerState::Uninitialized,
            threshold: config.threshold,
            top_k: config.top_k,
            events: event_tx.clone(),
        };

        tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                worker.handle(command).await;
            }
            debug!("Inference worker shutting down");
        });

        (
            WorkerHandle {
                commands: command_tx,
                events: event_tx,
            },
            event_rx,
        )
    }

    /// Process one command to completion.
    async fn handle(&mut self, command: WorkerCommand) {
        match command {
            WorkerCommand::Init => self.handle_init().await,
            WorkerCommand::InitializeEmbeddings { sentences } => {
                match self.initialize_embeddings(&sentences).await {
                    Ok(count) => {
                        info!("Computed {count} corpus embeddings");
                        self.emit(WorkerEvent::InitialEmbeddingsComputed { count })
                            .await;
                    }
                    Err(e) => self.report("Error in worker", &e).await,
                }
            }
            WorkerCommand::ComputeSimilarity { query } => {
                match self.compute_similarity(&query).await {
                    Ok(results) => {
                        debug!("Query \"{query}\" matched {} entries", results.len());
                        self.emit(WorkerEvent::SimilarityResults { query, results })
                            .await;
                    }
                    Err(e) => self.report("Error in worker", &e).await,
                }
            }
        }
    }

    async fn handle_init(&mut self) {
        if self.state == WorkerState::Ready {
            // Idempotent: a second Init just re-announces readiness.
            self.emit(WorkerEvent::ModelLoaded).await;
            return;
        }

        self.state = WorkerState::Loading;
        match self.provider.initialize().await {
            Ok(()) => {
                self.state = WorkerState::Ready;
                info!("Embedding model loaded: {}", self.provider.encoder_name());
                self.emit(WorkerEvent::ModelLoaded).await;
            }
            Err(e) => {
                // Retry only happens on an explicit re-Init.
                self.state = WorkerState::Uninitialized;
                self.report("Failed to load model", &e).await;
            }
        }
    }

    /// Batch-embed the corpus and store the vectors worker-side.
    async fn initialize_embeddings(&mut self, sentences: &[String]) -> Result<usize> {
        self.ensure_ready()?;
        let embeddings = self.provider.embed_batch(sentences).await?;
        let count = embeddings.len();
        self.corpus_embeddings = Some(embeddings);
        Ok(count)
    }

    /// Embed one query and rank it against the stored corpus embeddings.
    async fn compute_similarity(
        &self,
        query: &str,
    ) -> Result<Vec<typeahead_embeddings::SimilarityResult>> {
        self.ensure_ready()?;
        let corpus = self
            .corpus_embeddings
            .as_ref()
            .ok_or_else(|| SearchError::Protocol("corpus embeddings not computed".to_string()))?;

        let query_embedding = self.provider.embed(query).await?;
        let scored = rank(&query_embedding, corpus)?;
        Ok(filter_and_sort(scored, self.threshold, self.top_k))
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state == WorkerState::Ready {
            Ok(())
        } else {
            Err(SearchError::Embedding(EmbeddingError::ModelNotReady))
        }
    }

    async fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).await.is_err() {
            warn!("Event receiver dropped, discarding worker event");
        }
    }

    async fn report(&self, message: &str, cause: &(dyn std::fmt::Display + Sync)) {
        warn!("{message}: {cause}");
        self.emit(WorkerEvent::Error {
            message: message.to_string(),
            error: cause.to_string(),
        })
        .await;
    }
}

impl WorkerHandle {
    /// Send a typed command to the worker.
    pub async fn send(&self, command: WorkerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SearchError::WorkerClosed)
    }

    /// Send a raw JSON message across the boundary.
    ///
    /// An unrecognized message kind is a protocol violation: it is reported on
    /// the event channel as a [`WorkerEvent::Error`] and never reaches the
    /// worker, which stays usable.
    pub async fn send_value(&self, value: serde_json::Value) -> Result<()> {
        match WorkerCommand::from_value(value) {
            Ok(command) => self.send(command).await,
            Err(e) => {
                warn!("Rejected message at protocol boundary: {e}");
                self.events
                    .send(WorkerEvent::Error {
                        message: "Error in worker".to_string(),
                        error: e.to_string(),
                    })
                    .await
                    .map_err(|_| SearchError::WorkerClosed)
            }
        }
    }
}
