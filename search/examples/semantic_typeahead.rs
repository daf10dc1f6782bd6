//! Semantic typeahead demo against a live embeddings API.
//!
//! Requires `OPENAI_API_KEY`. Run with:
//!
//! ```sh
//! cargo run --example semantic_typeahead -- "feline on a mat"
//! ```

use std::sync::Arc;
use std::time::Duration;

use typeahead_embeddings::RemoteEncoder;
use typeahead_search::{SearchConfig, SearchCoordinator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "feline on a mat".to_string());

    let corpus = vec![
        "the cat sat on the mat".to_string(),
        "a dog ran across the park".to_string(),
        "quantum mechanics is hard".to_string(),
        "my kitten naps in the sun".to_string(),
        "compilers translate source code".to_string(),
    ];

    let encoder = Arc::new(RemoteEncoder::new());
    if !encoder.is_configured() {
        anyhow::bail!("set OPENAI_API_KEY to run this demo");
    }

    let handle = SearchCoordinator::spawn(corpus, encoder, SearchConfig::default());

    let mut state = handle.subscribe();
    while state.borrow().loading {
        state.changed().await?;
    }
    println!("corpus embedded, searching for: {query:?}");

    handle.query(query)?;

    // Wait out the debounce window plus the round-trip.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let snapshot = handle.state();
    if let Some(error) = snapshot.error {
        anyhow::bail!("search failed: {error}");
    }

    for (rank, result) in snapshot.results.iter().enumerate() {
        println!("{}. {result}", rank + 1);
    }

    Ok(())
}
