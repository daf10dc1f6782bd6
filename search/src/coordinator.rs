//! Search coordinator.
//!
//! Caller-facing side of the isolation boundary. The coordinator owns the
//! query cache and the request lifecycle: it debounces raw input into at most
//! one in-flight request per window, answers repeats from the cache, and
//! correlates asynchronous worker replies back to the query that produced
//! them. The collaborator (a UI, typically) only ever sees
//! [`SearchState`] snapshots through a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use typeahead_embeddings::{EmbeddingProvider, TextEncoder};

use crate::cache::QueryCache;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::protocol::{WorkerCommand, WorkerEvent};
use crate::worker::{InferenceWorker, WorkerHandle};

/// Snapshot of the collaborator-visible search state.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// True until the corpus embeddings are ready.
    pub loading: bool,

    /// The most recent surfaced error, if any.
    pub error: Option<String>,

    /// Currently visible result strings.
    pub results: Vec<String>,
}

/// Handle given to the collaborator.
#[derive(Clone)]
pub struct SearchHandle {
    queries: mpsc::UnboundedSender<String>,
    state: watch::Receiver<SearchState>,
}

impl SearchHandle {
    /// Submit a raw input text. Rapid successive calls are debounced.
    pub fn query(&self, text: impl Into<String>) -> Result<()> {
        self.queries
            .send(text.into())
            .map_err(|_| SearchError::WorkerClosed)
    }

    /// Get the current state snapshot.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }
}

/// A debounced query waiting for its timer to fire.
struct PendingQuery {
    text: String,
    deadline: Instant,
}

/// Coordinator task state.
pub struct SearchCoordinator {
    /// The fixed corpus, in positional order.
    corpus: Arc<Vec<String>>,

    /// Resolved-results cache, keyed by exact query string.
    cache: QueryCache,

    /// Engine configuration.
    config: SearchConfig,

    /// Command handle into the inference worker.
    worker: WorkerHandle,

    /// Events from the inference worker.
    events: mpsc::Receiver<WorkerEvent>,

    /// Raw input from the collaborator.
    queries: mpsc::UnboundedReceiver<String>,

    /// Published state.
    state: watch::Sender<SearchState>,

    /// The single debounce slot. A new query replaces it wholesale.
    pending: Option<PendingQuery>,
}

impl SearchCoordinator {
    /// Spawn the coordinator and its inference worker.
    ///
    /// The corpus is fixed for the life of the engine. The initial state is
    /// `{ loading: true, error: None, results: corpus }`; `loading` clears
    /// once the worker reports its corpus embeddings ready.
    pub fn spawn(
        corpus: Vec<String>,
        encoder: Arc<dyn TextEncoder>,
        config: SearchConfig,
    ) -> SearchHandle {
        let provider = EmbeddingProvider::new(encoder);
        let (worker, events) = InferenceWorker::spawn(provider, &config);

        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState {
            loading: true,
            error: None,
            results: corpus.clone(),
        });

        let coordinator = Self {
            cache: QueryCache::new(config.max_cache_size),
            corpus: Arc::new(corpus),
            config,
            worker,
            events,
            queries: query_rx,
            state: state_tx,
            pending: None,
        };

        tokio::spawn(coordinator.run());

        SearchHandle {
            queries: query_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        info!("Search coordinator started, requesting model load");
        if let Err(e) = self.worker.send(WorkerCommand::Init).await {
            self.surface_error("Failed to load model", &e);
            return;
        }

        loop {
            let deadline = self.pending.as_ref().map(|p| p.deadline);

            tokio::select! {
                maybe_text = self.queries.recv() => match maybe_text {
                    Some(text) => self.on_query(text),
                    None => break,
                },
                maybe_event = self.events.recv() => match maybe_event {
                    Some(event) => self.on_event(event).await,
                    None => break,
                },
                _ = debounce_timer(deadline), if deadline.is_some() => {
                    self.fire_pending().await;
                }
            }
        }

        debug!("Search coordinator shutting down");
    }

    /// Handle one raw input from the collaborator.
    fn on_query(&mut self, text: String) {
        if text.is_empty() {
            // Empty input short-circuits: show the whole corpus and discard
            // any request that was still waiting on its timer.
            self.pending = None;
            let corpus = self.corpus.as_ref().clone();
            self.state.send_modify(|s| s.results = corpus);
            return;
        }

        // Single-slot debounce: replacing the slot cancels the previous
        // not-yet-fired timer, so at most one request per window survives.
        let delay = self.config.debounce_for(&text);
        self.pending = Some(PendingQuery {
            text,
            deadline: Instant::now() + delay,
        });
    }

    /// The debounce timer fired: serve from cache or dispatch to the worker.
    async fn fire_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        if let Some(hit) = self.cache.get(&pending.text) {
            debug!("Cache hit for \"{}\"", pending.text);
            let results = hit.clone();
            self.state.send_modify(|s| s.results = results);
            return;
        }

        debug!("Dispatching similarity request for \"{}\"", pending.text);
        if let Err(e) = self
            .worker
            .send(WorkerCommand::ComputeSimilarity {
                query: pending.text,
            })
            .await
        {
            self.surface_error("Error in worker", &e);
        }
        // Prior results stay visible until the reply arrives.
    }

    async fn on_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::ModelLoaded => {
                info!("Model loaded, embedding corpus of {} entries", self.corpus.len());
                let sentences = self.corpus.as_ref().clone();
                if let Err(e) = self
                    .worker
                    .send(WorkerCommand::InitializeEmbeddings { sentences })
                    .await
                {
                    self.surface_error("Error in worker", &e);
                }
            }
            WorkerEvent::InitialEmbeddingsComputed { count } => {
                info!("Corpus embeddings ready ({count} entries), accepting queries");
                self.state.send_modify(|s| s.loading = false);
            }
            WorkerEvent::SimilarityResults { query, results } => {
                let resolved: Vec<String> = results
                    .iter()
                    .filter_map(|r| self.corpus.get(r.index).cloned())
                    .collect();

                // Cache under the request's own echoed query, never under
                // whatever the collaborator is typing now.
                self.cache.put(query, resolved.clone());

                // Published unconditionally: a slow reply can overwrite newer
                // results. The echoed query above is the hook for dropping
                // stale replies if a monotonic request id is added.
                self.state.send_modify(|s| {
                    s.error = None;
                    s.results = resolved;
                });
            }
            WorkerEvent::Error { message, error } => {
                self.surface_error(&message, &error);
            }
        }
    }

    /// Surface an error without disturbing the visible results.
    fn surface_error(&self, message: &str, cause: &dyn std::fmt::Display) {
        warn!("{message}: {cause}");
        let surfaced = format!("{message}: {cause}");
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(surfaced);
        });
    }
}

/// Sleep until the debounce deadline, or forever when no query is pending.
///
/// The `pending().await` arm is unreachable: the select guard only polls this
/// future when a deadline exists.
async fn debounce_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
