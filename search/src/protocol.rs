//! Wire protocol between the coordinator and the inference worker.
//!
//! Messages are JSON-serializable tagged unions keyed on a `type` field.
//! Commands flow to the worker; events flow back. The two directions are
//! independent channels, each delivering in send order.

use serde::{Deserialize, Serialize};

use typeahead_embeddings::SimilarityResult;

use crate::error::{Result, SearchError};

/// Commands accepted by the inference worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerCommand {
    /// Request model load.
    Init,

    /// Embed the corpus.
    InitializeEmbeddings {
        /// Corpus entries, in positional order.
        sentences: Vec<String>,
    },

    /// Request ranking for one query.
    ComputeSimilarity {
        /// The query text, echoed back on the response for correlation.
        query: String,
    },
}

impl WorkerCommand {
    /// Decode a command from a raw JSON value at the protocol boundary.
    ///
    /// An unrecognized `type` is a protocol violation.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SearchError::Protocol(e.to_string()))
    }
}

/// Events emitted by the inference worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerEvent {
    /// The model finished loading.
    ModelLoaded,

    /// Corpus embeddings are ready. The vectors themselves stay worker-side.
    InitialEmbeddingsComputed {
        /// Number of corpus entries embedded.
        count: usize,
    },

    /// Ranked, filtered, top-K results for one query.
    SimilarityResults {
        /// The originating query, for correlation.
        query: String,

        /// Results ordered by similarity descending.
        results: Vec<SimilarityResult>,
    },

    /// A reported failure. Non-fatal to the worker.
    Error {
        /// Human-readable summary.
        message: String,

        /// Stringified cause.
        error: String,
    },
}
