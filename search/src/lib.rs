//! # Typeahead Search
//!
//! This crate coordinates free-text queries against a fixed corpus of
//! candidate strings, ranked by semantic similarity, without blocking the
//! caller while the embedding model runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Semantic Typeahead                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  query(text) ──► SearchCoordinator ──► QueryCache           │
//! │                        │     ▲                              │
//! │               commands │     │ events                      │
//! │                        ▼     │                              │
//! │                  InferenceWorker ──► EmbeddingProvider      │
//! │                        │                                    │
//! │                        ▼                                    │
//! │                 rank + filter_and_sort                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator and the worker are independent tasks joined only by two
//! mpsc channels, one per direction. Rapid keystrokes are coalesced by a
//! single-slot debounce timer before any command crosses the boundary, and
//! repeated queries are answered from a bounded cache without a round-trip.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use typeahead_search::{SearchConfig, SearchCoordinator};
//!
//! let handle = SearchCoordinator::spawn(corpus, encoder, SearchConfig::default());
//! handle.query("feline on a mat")?;
//! let state = handle.state(); // { loading, error, results }
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod worker;

pub use cache::QueryCache;
pub use config::SearchConfig;
pub use coordinator::{SearchCoordinator, SearchHandle, SearchState};
pub use error::{Result, SearchError};
pub use protocol::{WorkerCommand, WorkerEvent};
pub use worker::{InferenceWorker, WorkerHandle};

// Re-export from dependencies for convenience
pub use typeahead_embeddings::{SimilarityResult, TextEncoder};
