//! Configuration for the search coordination engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the search coordination engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity for a result to be returned.
    pub threshold: f32,

    /// Maximum number of results per query.
    pub top_k: usize,

    /// Debounce window for short inputs, in milliseconds.
    pub debounce_short_ms: u64,

    /// Debounce window for longer inputs, in milliseconds.
    pub debounce_long_ms: u64,

    /// Inputs up to this length use the short debounce window.
    pub short_query_len: usize,

    /// Maximum number of distinct queries held in the cache.
    pub max_cache_size: usize,

    /// Capacity of the command channel into the worker.
    pub command_buffer: usize,
}

impl SearchConfig {
    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum number of results.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the debounce windows.
    pub fn with_debounce(mut self, short_ms: u64, long_ms: u64) -> Self {
        self.debounce_short_ms = short_ms;
        self.debounce_long_ms = long_ms;
        self
    }

    /// Set the cache capacity.
    pub fn with_max_cache_size(mut self, max_cache_size: usize) -> Self {
        self.max_cache_size = max_cache_size;
        self
    }

    /// Debounce delay for a given input.
    ///
    /// Short inputs are likely still being typed character by character, so
    /// they get the shorter window; longer inputs are more likely a completed
    /// thought but still benefit from coalescing rapid keystrokes.
    pub fn debounce_for(&self, text: &str) -> Duration {
        if text.len() <= self.short_query_len {
            Duration::from_millis(self.debounce_short_ms)
        } else {
            Duration::from_millis(self.debounce_long_ms)
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            top_k: 5,
            debounce_short_ms: 300,
            debounce_long_ms: 500,
            short_query_len: 5,
            max_cache_size: 64,
            command_buffer: 32,
        }
    }
}
