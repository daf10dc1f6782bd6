//! Cross-component scenarios for the search engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use typeahead_embeddings::{Embedding, TextEncoder};
use typeahead_search::{SearchConfig, SearchCoordinator, SearchHandle};

/// A tiny bag-of-words encoder with a synonym table.
///
/// Each content word contributes a fixed unit axis; synonyms share an axis,
/// so "feline" and "cat" pool to nearby vectors. Stopwords are dropped,
/// unknown words land on a shared out-of-vocabulary axis.
struct VocabEncoder;

const AXES: usize = 8;

impl VocabEncoder {
    fn axis(word: &str) -> Option<usize> {
        match word {
            "the" | "a" | "is" | "and" => None,
            "cat" | "feline" | "kitten" => Some(0),
            "sat" | "mat" | "on" => Some(1),
            "dog" | "hound" => Some(2),
            "ran" | "run" => Some(3),
            "quantum" | "mechanics" => Some(4),
            "hard" => Some(5),
            _ => Some(7),
        }
    }
}

#[async_trait]
impl TextEncoder for VocabEncoder {
    fn name(&self) -> &str {
        "vocab"
    }

    fn dimension(&self) -> usize {
        AXES
    }

    async fn encode(&self, text: &str) -> typeahead_embeddings::Result<Vec<Embedding>> {
        let rows: Vec<Embedding> = text
            .split_whitespace()
            .filter_map(Self::axis)
            .map(|axis| {
                let mut row = vec![0.0f32; AXES];
                row[axis] = 1.0;
                row
            })
            .collect();

        if rows.is_empty() {
            Ok(vec![vec![0.0f32; AXES]])
        } else {
            Ok(rows)
        }
    }
}

fn corpus() -> Vec<String> {
    vec![
        "the cat sat".to_string(),
        "a dog ran".to_string(),
        "quantum mechanics is hard".to_string(),
    ]
}

async fn ready_handle(config: SearchConfig) -> SearchHandle {
    let handle = SearchCoordinator::spawn(corpus(), Arc::new(VocabEncoder), config);
    let mut state = handle.subscribe();
    while state.borrow().loading {
        state.changed().await.unwrap();
    }
    handle
}

async fn results_after(handle: &SearchHandle, previous: &[String]) -> Vec<String> {
    let mut state = handle.subscribe();
    loop {
        let current = state.borrow().results.clone();
        if current != previous {
            return current;
        }
        state.changed().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_feline_query_ranks_cat_sentence_first() {
    let handle = ready_handle(SearchConfig::default()).await;

    handle.query("feline on a mat").unwrap();
    let results = results_after(&handle, &corpus()).await;

    // "feline on a mat" shares the cat and sat/mat axes with "the cat sat"
    // and almost nothing with the other two entries, so only the cat sentence
    // clears the 0.7 threshold.
    assert_eq!(results.first().map(String::as_str), Some("the cat sat"));
    assert!(!results.contains(&"quantum mechanics is hard".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_results_respect_top_k_bound() {
    let config = SearchConfig::default().with_top_k(1).with_threshold(0.0);
    let handle = ready_handle(config).await;

    handle.query("the cat is a dog").unwrap();
    let results = results_after(&handle, &corpus()).await;

    assert_eq!(results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_stream_produces_single_search() {
    let handle = ready_handle(SearchConfig::default()).await;

    // Rapid keystrokes, all inside the debounce window.
    for text in ["f", "fe", "fel", "feli", "felin", "feline"] {
        handle.query(text).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let results = results_after(&handle, &corpus()).await;
    assert_eq!(results, vec!["the cat sat".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_restores_corpus() {
    let handle = ready_handle(SearchConfig::default()).await;

    handle.query("feline").unwrap();
    let narrowed = results_after(&handle, &corpus()).await;
    assert_eq!(narrowed.len(), 1);

    handle.query("").unwrap();
    let restored = results_after(&handle, &narrowed).await;
    assert_eq!(restored, corpus());
}

#[tokio::test(start_paused = true)]
async fn test_unrelated_query_returns_nothing_over_threshold() {
    let handle = ready_handle(SearchConfig::default()).await;

    handle.query("zebra xylophone").unwrap();
    let results = results_after(&handle, &corpus()).await;

    assert!(results.is_empty());
}
