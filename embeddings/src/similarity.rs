//! Similarity ranking for embeddings.
//!
//! Pure computation, no I/O. Inputs are expected to be unit-normalized, so
//! cosine similarity against the corpus reduces to a dot product.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// A similarity result referencing a corpus position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Index of the matched corpus entry.
    pub index: usize,

    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

impl SimilarityResult {
    /// Create a new similarity result.
    pub fn new(index: usize, similarity: f32) -> Self {
        Self { index, similarity }
    }
}

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical vectors
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// Compute the dot product between two embeddings.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Normalize an embedding to unit length.
pub fn normalize(embedding: &mut Embedding) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// Mean-pool token-level vectors into a single embedding.
pub fn mean_pool(rows: &[Embedding]) -> Result<Embedding> {
    let first = rows
        .first()
        .ok_or_else(|| EmbeddingError::InvalidResponse("encoder returned no rows".to_string()))?;

    let dim = first.len();
    for row in rows {
        if row.len() != dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dim,
                actual: row.len(),
            });
        }
    }

    let n = rows.len() as f32;
    let mut pooled = vec![0.0f32; dim];

    for row in rows {
        for (i, val) in row.iter().enumerate() {
            pooled[i] += val / n;
        }
    }

    Ok(pooled)
}

/// Score every corpus entry against a query embedding.
///
/// Both sides must be unit-normalized; the score is the inner product. Results
/// come back in corpus order, one per entry.
pub fn rank(query: &Embedding, corpus: &[Embedding]) -> Result<Vec<SimilarityResult>> {
    let mut results = Vec::with_capacity(corpus.len());

    for (index, embedding) in corpus.iter().enumerate() {
        let similarity = dot_product(query, embedding)?;
        results.push(SimilarityResult::new(index, similarity));
    }

    Ok(results)
}

/// Filter scored results by threshold, order them, and truncate to `top_k`.
///
/// Entries strictly below `threshold` are dropped before ordering, so a weak
/// match never surfaces merely because it is the least bad. Ordering is by
/// similarity descending with ties broken by ascending corpus index, which
/// keeps the output deterministic for identical inputs.
pub fn filter_and_sort(
    results: Vec<SimilarityResult>,
    threshold: f32,
    top_k: usize,
) -> Vec<SimilarityResult> {
    let mut kept: Vec<SimilarityResult> = results
        .into_iter()
        .filter(|r| r.similarity >= threshold)
        .collect();

    kept.sort_by_key(|r| (std::cmp::Reverse(OrderedFloat(r.similarity)), r.index));
    kept.truncate(top_k);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(cosine_similarity(&a, &b).is_err());
        assert!(dot_product(&a, &b).is_err());
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_mean_pool() {
        let rows = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let pooled = mean_pool(&rows).unwrap();
        assert_eq!(pooled, vec![0.5, 0.5]);
    }

    #[test]
    fn test_mean_pool_empty_fails() {
        assert!(mean_pool(&[]).is_err());
    }

    #[test]
    fn test_mean_pool_ragged_fails() {
        let rows = vec![vec![1.0, 0.0], vec![0.0]];
        assert!(mean_pool(&rows).is_err());
    }

    #[test]
    fn test_rank_is_corpus_ordered() {
        let query = vec![1.0, 0.0];
        let corpus = vec![vec![0.0, 1.0], vec![1.0, 0.0]];

        let results = rank(&query, &corpus).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[1].index, 1);
        assert!((results[1].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_filter_and_sort_threshold() {
        let results = vec![
            SimilarityResult::new(0, 0.9),
            SimilarityResult::new(1, 0.5),
            SimilarityResult::new(2, 0.75),
        ];

        let kept = filter_and_sort(results, 0.7, 5);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.similarity >= 0.7));
        assert_eq!(kept[0].index, 0);
        assert_eq!(kept[1].index, 2);
    }

    #[test]
    fn test_filter_and_sort_top_k() {
        let results = (0..10)
            .map(|i| SimilarityResult::new(i, 0.8 + i as f32 * 0.01))
            .collect();

        let kept = filter_and_sort(results, 0.7, 5);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].index, 9);
    }

    #[test]
    fn test_filter_and_sort_tie_break_ascending_index() {
        let results = vec![
            SimilarityResult::new(3, 0.8),
            SimilarityResult::new(1, 0.8),
            SimilarityResult::new(2, 0.9),
        ];

        let kept = filter_and_sort(results, 0.7, 5);
        let indices: Vec<usize> = kept.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 1, 3]);
    }

    #[test]
    fn test_filter_and_sort_deterministic() {
        let make = || {
            vec![
                SimilarityResult::new(0, 0.71),
                SimilarityResult::new(1, 0.71),
                SimilarityResult::new(2, 0.95),
                SimilarityResult::new(3, 0.3),
            ]
        };

        let a = filter_and_sort(make(), 0.7, 3);
        let b = filter_and_sort(make(), 0.7, 3);
        assert_eq!(a, b);
    }
}
