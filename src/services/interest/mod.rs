// ============================================
// Interest Tracker
// ============================================
//
// Maintains per-user sparse tag->weight vectors from post interactions.
//
// Action deltas (applied per tag occurrence):
// - Like:    +1.0
// - Comment: +2.0
// - View:    +0.5
// - Unlike:  -1.0
//
// Weights are floored at zero; the store applies deltas atomically per user
// so concurrent interactions cannot lose updates.

use crate::models::InteractionKind;
use crate::storage::InterestVectorStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Canonical vector normalization, used everywhere a stored vector is read:
/// lowercases keys, drops non-finite and non-positive weights, and merges
/// case collisions by summing.
pub fn normalize_weights(raw: &HashMap<String, f64>) -> HashMap<String, f64> {
    let mut normalized = HashMap::with_capacity(raw.len());
    for (tag, weight) in raw {
        if !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        *normalized.entry(tag.to_lowercase()).or_insert(0.0) += *weight;
    }
    normalized
}

/// Records tagged interactions and serves normalized interest vectors.
pub struct InterestTracker {
    store: Arc<dyn InterestVectorStore>,
}

impl InterestTracker {
    pub fn new(store: Arc<dyn InterestVectorStore>) -> Self {
        Self { store }
    }

    /// The user's normalized interest vector; empty when no record exists.
    pub async fn vector_for(&self, user_id: Uuid) -> Result<HashMap<String, f64>> {
        match self.store.load(user_id).await? {
            Some(vector) => Ok(normalize_weights(&vector.weights)),
            None => Ok(HashMap::new()),
        }
    }

    /// Apply one interaction against a post's tags. A tag appearing twice in
    /// `tags` is incremented twice. Silently no-ops on an empty tag list.
    pub async fn apply_interaction(
        &self,
        user_id: Uuid,
        tags: &[String],
        kind: InteractionKind,
    ) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }

        let delta = kind.delta();
        let mut accumulated: HashMap<String, f64> = HashMap::new();
        for tag in tags {
            *accumulated.entry(tag.to_lowercase()).or_insert(0.0) += delta;
        }

        let deltas: Vec<(String, f64)> = accumulated.into_iter().collect();
        self.store.apply_deltas(user_id, &deltas).await?;

        debug!(
            user_id = %user_id,
            tag_count = deltas.len(),
            action = ?kind,
            "Interest vector updated"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryVectorStore;

    fn tracker() -> InterestTracker {
        InterestTracker::new(Arc::new(InMemoryVectorStore::new()))
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_drops_bad_entries() {
        let mut raw = HashMap::new();
        raw.insert("books".to_string(), 2.0);
        raw.insert("stale".to_string(), 0.0);
        raw.insert("negative".to_string(), -1.0);
        raw.insert("broken".to_string(), f64::NAN);

        let normalized = normalize_weights(&raw);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("books"), Some(&2.0));
    }

    #[test]
    fn test_normalize_merges_case_collisions() {
        let mut raw = HashMap::new();
        raw.insert("Books".to_string(), 1.0);
        raw.insert("books".to_string(), 2.0);

        let normalized = normalize_weights(&raw);
        assert_eq!(normalized.get("books"), Some(&3.0));
    }

    #[tokio::test]
    async fn test_like_then_unlike_floors_at_zero() {
        let tracker = tracker();
        let user = Uuid::new_v4();

        tracker
            .apply_interaction(user, &tags(&["books"]), InteractionKind::View)
            .await
            .unwrap();
        tracker
            .apply_interaction(user, &tags(&["books"]), InteractionKind::Unlike)
            .await
            .unwrap();
        tracker
            .apply_interaction(user, &tags(&["books"]), InteractionKind::Unlike)
            .await
            .unwrap();

        // 0.5 - 1.0 floors at zero; the zero entry is dropped on read.
        let vector = tracker.vector_for(user).await.unwrap();
        assert!(vector.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_tag_counts_per_occurrence() {
        let tracker = tracker();
        let user = Uuid::new_v4();

        tracker
            .apply_interaction(user, &tags(&["books", "books"]), InteractionKind::Like)
            .await
            .unwrap();

        let vector = tracker.vector_for(user).await.unwrap();
        assert_eq!(vector.get("books"), Some(&2.0));
    }

    #[tokio::test]
    async fn test_comment_outweighs_like() {
        let tracker = tracker();
        let user = Uuid::new_v4();

        tracker
            .apply_interaction(user, &tags(&["music"]), InteractionKind::Like)
            .await
            .unwrap();
        tracker
            .apply_interaction(user, &tags(&["music"]), InteractionKind::Comment)
            .await
            .unwrap();

        let vector = tracker.vector_for(user).await.unwrap();
        assert_eq!(vector.get("music"), Some(&3.0));
    }

    #[tokio::test]
    async fn test_empty_tags_is_noop() {
        let tracker = tracker();
        let user = Uuid::new_v4();

        tracker
            .apply_interaction(user, &[], InteractionKind::Like)
            .await
            .unwrap();

        assert!(tracker.vector_for(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_weights_never_negative_under_unlike_sequences() {
        let tracker = tracker();
        let user = Uuid::new_v4();

        for kind in [
            InteractionKind::Like,
            InteractionKind::Unlike,
            InteractionKind::Unlike,
            InteractionKind::View,
            InteractionKind::Unlike,
            InteractionKind::Comment,
            InteractionKind::Unlike,
        ] {
            tracker
                .apply_interaction(user, &tags(&["cameras"]), kind)
                .await
                .unwrap();
        }

        let vector = tracker.vector_for(user).await.unwrap();
        for weight in vector.values() {
            assert!(*weight >= 0.0);
        }
    }
}
