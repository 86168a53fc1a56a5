// ============================================
// Similarity Engine
// ============================================
//
// Cosine similarity between user interest vectors, and the all-pairs scan
// that feeds collaborative ranking.
//
// Formula: cos(A, B) = (A . B) / (||A|| x ||B||), 0 when either norm is 0.

use crate::models::{SimilarityEdge, UserSimilarity};
use crate::services::interest::normalize_weights;
use crate::storage::InterestVectorStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Cosine similarity between two sparse tag vectors. The dot product runs
/// over the key union; keys present in only one vector contribute nothing.
pub fn cosine(vec_a: &HashMap<String, f64>, vec_b: &HashMap<String, f64>) -> f64 {
    if vec_a.is_empty() || vec_b.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = vec_a
        .iter()
        .filter_map(|(tag, weight_a)| vec_b.get(tag).map(|weight_b| weight_a * weight_b))
        .sum();

    let norm_a: f64 = vec_a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = vec_b.values().map(|w| w * w).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Computes user-user similarities over the vector store.
pub struct SimilarityEngine {
    vectors: Arc<dyn InterestVectorStore>,
}

impl SimilarityEngine {
    pub fn new(vectors: Arc<dyn InterestVectorStore>) -> Self {
        Self { vectors }
    }

    /// Cosine similarity for every unordered user pair with similarity > 0,
    /// each edge carrying both vector snapshots for auditability.
    ///
    /// O(U^2 * T) over users with a recorded vector. Fine for small
    /// populations; at scale this wants a periodically refreshed cache or an
    /// ANN index instead of a per-request scan.
    pub async fn all_pair_similarities(&self) -> Result<Vec<SimilarityEdge>> {
        let vectors = self.vectors.load_all().await?;
        let normalized: Vec<(Uuid, HashMap<String, f64>)> = vectors
            .iter()
            .map(|v| (v.user_id, normalize_weights(&v.weights)))
            .collect();

        let mut edges = Vec::new();
        for (i, (user_a, vec_a)) in normalized.iter().enumerate() {
            for (user_b, vec_b) in normalized.iter().skip(i + 1) {
                let similarity = cosine(vec_a, vec_b);
                if similarity > 0.0 {
                    edges.push(SimilarityEdge {
                        user_a: *user_a,
                        user_b: *user_b,
                        similarity,
                        vector_a: vec_a.clone(),
                        vector_b: vec_b.clone(),
                    });
                }
            }
        }

        info!(
            user_count = normalized.len(),
            edge_count = edges.len(),
            "All-pair similarity scan complete"
        );

        Ok(edges)
    }

    /// Users most similar to `base` (excluding `user_id` itself), strictly
    /// above `min_similarity`, sorted descending, optionally capped.
    pub async fn neighbors_of(
        &self,
        user_id: Uuid,
        base: &HashMap<String, f64>,
        min_similarity: f64,
        limit: Option<usize>,
    ) -> Result<Vec<UserSimilarity>> {
        if base.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.vectors.load_all().await?;
        let mut neighbors: Vec<UserSimilarity> = vectors
            .iter()
            .filter(|v| v.user_id != user_id)
            .filter_map(|v| {
                let similarity = cosine(base, &normalize_weights(&v.weights));
                (similarity > min_similarity).then_some(UserSimilarity {
                    user_id: v.user_id,
                    similarity,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(limit) = limit {
            neighbors.truncate(limit);
        }

        Ok(neighbors)
    }

    /// Most similar users for one user, from their stored vector. Backs the
    /// discover surface.
    pub async fn similar_users(&self, user_id: Uuid, limit: usize) -> Result<Vec<UserSimilarity>> {
        let base = match self.vectors.load(user_id).await? {
            Some(vector) => normalize_weights(&vector.weights),
            None => return Ok(Vec::new()),
        };
        self.neighbors_of(user_id, &base, 0.0, Some(limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryVectorStore, InterestVectorStore as _};

    fn vec_of(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_cosine_identical_vector_is_one() {
        let v = vec_of(&[("books", 2.0), ("music", 1.0)]);
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec_of(&[("books", 2.0), ("music", 1.0)]);
        let b = vec_of(&[("books", 0.5), ("hiking", 3.0)]);
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
    }

    #[test]
    fn test_cosine_empty_vector_is_zero() {
        let a = vec_of(&[("books", 2.0)]);
        let empty = HashMap::new();
        assert_eq!(cosine(&a, &empty), 0.0);
        assert_eq!(cosine(&empty, &a), 0.0);
        assert_eq!(cosine(&empty, &empty), 0.0);
    }

    #[test]
    fn test_cosine_all_zero_vector_is_zero() {
        let a = vec_of(&[("books", 2.0)]);
        let zeroed = vec_of(&[("books", 0.0)]);
        assert_eq!(cosine(&a, &zeroed), 0.0);
    }

    #[test]
    fn test_cosine_disjoint_vectors_are_orthogonal() {
        let a = vec_of(&[("books", 1.0)]);
        let b = vec_of(&[("music", 1.0)]);
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[tokio::test]
    async fn test_all_pairs_skips_orthogonal_users() {
        let store = Arc::new(InMemoryVectorStore::new());
        let reader = Uuid::new_v4();
        let listener = Uuid::new_v4();
        let bookworm = Uuid::new_v4();

        store
            .apply_deltas(reader, &[("books".to_string(), 2.0)])
            .await
            .unwrap();
        store
            .apply_deltas(listener, &[("music".to_string(), 1.0)])
            .await
            .unwrap();
        store
            .apply_deltas(bookworm, &[("books".to_string(), 1.0)])
            .await
            .unwrap();

        let engine = SimilarityEngine::new(store);
        let edges = engine.all_pair_similarities().await.unwrap();

        // Only the two book readers overlap.
        assert_eq!(edges.len(), 1);
        let edge = &edges[0];
        assert!((edge.similarity - 1.0).abs() < 1e-9);
        assert!(edge.vector_a.contains_key("books"));
        assert!(edge.vector_b.contains_key("books"));
    }

    #[tokio::test]
    async fn test_neighbors_sorted_and_thresholded() {
        let store = Arc::new(InMemoryVectorStore::new());
        let close = Uuid::new_v4();
        let far = Uuid::new_v4();

        store
            .apply_deltas(close, &[("books".to_string(), 3.0), ("music".to_string(), 0.5)])
            .await
            .unwrap();
        store
            .apply_deltas(far, &[("books".to_string(), 0.2), ("gaming".to_string(), 5.0)])
            .await
            .unwrap();

        let engine = SimilarityEngine::new(store);
        let base = vec_of(&[("books", 2.0)]);
        let viewer = Uuid::new_v4();

        let neighbors = engine.neighbors_of(viewer, &base, 0.0, None).await.unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].user_id, close);
        assert!(neighbors[0].similarity > neighbors[1].similarity);

        // A higher floor drops the weak match.
        let close_only = engine.neighbors_of(viewer, &base, 0.5, None).await.unwrap();
        assert_eq!(close_only.len(), 1);
        assert_eq!(close_only[0].user_id, close);
    }
}
