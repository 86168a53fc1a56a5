//! Dedicated recommendation strategy for the standalone recommendation
//! surface.
//!
//! Algorithm:
//! 1. User vector = the viewer's normalized interest vector only (no
//!    declared-interest boost). Empty vector short-circuits to an empty
//!    result.
//! 2. Neighbors filtered to similarity > 0.1, sorted descending.
//! 3. Per candidate: content = cosine(user vector, binary post-tag vector);
//!    collab = sum of liker-neighbor similarities + 0.5 x author-neighbor
//!    similarity; final = 0.7 * content + 0.3 * collab.
//! 4. Top N with the full content/collaborative/final breakdown attached.

use super::{binary_tag_vector, CANDIDATE_LIMIT};
use crate::models::{ScoreBreakdown, ScoredPost};
use crate::services::interest::InterestTracker;
use crate::services::similarity::{cosine, SimilarityEngine};
use crate::storage::PostRepository;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Neighbors below this similarity contribute no collaborative signal.
const MIN_NEIGHBOR_SIMILARITY: f64 = 0.1;
/// Content / collaborative blend.
const CONTENT_WEIGHT: f64 = 0.7;
const COLLAB_WEIGHT: f64 = 0.3;
/// A similar user authoring the post counts at half their similarity.
const AUTHOR_SIMILARITY_WEIGHT: f64 = 0.5;

pub const DEFAULT_LIMIT: usize = 20;

pub struct DedicatedStrategy {
    interest: Arc<InterestTracker>,
    similarity: Arc<SimilarityEngine>,
    posts: Arc<dyn PostRepository>,
}

impl DedicatedStrategy {
    pub fn new(
        interest: Arc<InterestTracker>,
        similarity: Arc<SimilarityEngine>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            interest,
            similarity,
            posts,
        }
    }

    pub async fn recommend(&self, viewer: Uuid, limit: usize) -> Result<Vec<ScoredPost>> {
        let user_vector = self.interest.vector_for(viewer).await?;
        if user_vector.is_empty() {
            info!(viewer = %viewer, "No interaction history, returning empty recommendations");
            return Ok(Vec::new());
        }

        let neighbors = self
            .similarity
            .neighbors_of(viewer, &user_vector, MIN_NEIGHBOR_SIMILARITY, None)
            .await?;

        let candidates = self.posts.candidate_posts(viewer, CANDIDATE_LIMIT).await?;

        let mut scored: Vec<ScoredPost> = candidates
            .into_iter()
            .filter(|post| post.author_id != viewer && !post.tags.is_empty())
            .map(|post| {
                let post_vector = binary_tag_vector(&post.tags);
                let content = cosine(&user_vector, &post_vector);

                let mut collaborative = 0.0;
                for neighbor in &neighbors {
                    if post.liked_by.contains(&neighbor.user_id) {
                        collaborative += neighbor.similarity;
                    }
                    if post.author_id == neighbor.user_id {
                        collaborative += AUTHOR_SIMILARITY_WEIGHT * neighbor.similarity;
                    }
                }

                let total = CONTENT_WEIGHT * content + COLLAB_WEIGHT * collaborative;
                ScoredPost {
                    post,
                    score: ScoreBreakdown {
                        content,
                        collaborative,
                        total,
                    },
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.post.created_at.cmp(&a.post.created_at))
        });
        scored.truncate(limit);

        info!(
            viewer = %viewer,
            neighbor_count = neighbors.len(),
            recommendation_count = scored.len(),
            "Dedicated recommendations generated"
        );

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionKind, Post};
    use crate::storage::{InMemoryPostRepository, InMemoryVectorStore};
    use chrono::{Duration, Utc};

    struct Fixture {
        interest: Arc<InterestTracker>,
        posts: Arc<InMemoryPostRepository>,
        strategy: DedicatedStrategy,
    }

    fn fixture() -> Fixture {
        let vectors = Arc::new(InMemoryVectorStore::new());
        let posts = Arc::new(InMemoryPostRepository::new());
        let interest = Arc::new(InterestTracker::new(vectors.clone()));
        let similarity = Arc::new(SimilarityEngine::new(vectors));
        let strategy =
            DedicatedStrategy::new(interest.clone(), similarity, posts.clone());

        Fixture {
            interest,
            posts,
            strategy,
        }
    }

    fn post(author: Uuid, tags: &[&str], age_minutes: i64) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id: author,
            content: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            liked_by: Vec::new(),
            commented_by: Vec::new(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_empty_vector_returns_empty() {
        let fixture = fixture();
        let viewer = Uuid::new_v4();

        fixture.posts.insert(post(Uuid::new_v4(), &["books"], 5));

        let result = fixture.strategy.recommend(viewer, 10).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_exact_tag_match_scores_full_content() {
        let fixture = fixture();
        let viewer = Uuid::new_v4();
        let author = Uuid::new_v4();

        fixture
            .interest
            .apply_interaction(viewer, &["books".to_string()], InteractionKind::Like)
            .await
            .unwrap();

        fixture.posts.insert(post(author, &["books"], 5));

        let result = fixture.strategy.recommend(viewer, 10).await.unwrap();
        assert_eq!(result.len(), 1);
        let breakdown = result[0].score;
        assert!((breakdown.content - 1.0).abs() < 1e-9);
        assert_eq!(breakdown.collaborative, 0.0);
        assert!((breakdown.total - CONTENT_WEIGHT).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_author_similarity_contributes_collab() {
        let fixture = fixture();
        let viewer = Uuid::new_v4();
        let twin = Uuid::new_v4();

        // Identical histories: similarity 1.0, well above the 0.1 floor.
        for user in [viewer, twin] {
            fixture
                .interest
                .apply_interaction(user, &["books".to_string()], InteractionKind::Like)
                .await
                .unwrap();
        }

        fixture.posts.insert(post(twin, &["books"], 5));

        let result = fixture.strategy.recommend(viewer, 10).await.unwrap();
        assert_eq!(result.len(), 1);
        let breakdown = result[0].score;
        assert!((breakdown.collaborative - AUTHOR_SIMILARITY_WEIGHT).abs() < 1e-9);
        assert!(
            (breakdown.total - (CONTENT_WEIGHT + COLLAB_WEIGHT * AUTHOR_SIMILARITY_WEIGHT)).abs()
                < 1e-9
        );
    }

    #[tokio::test]
    async fn test_limit_and_ordering() {
        let fixture = fixture();
        let viewer = Uuid::new_v4();
        let author = Uuid::new_v4();

        fixture
            .interest
            .apply_interaction(
                viewer,
                &["books".to_string(), "music".to_string()],
                InteractionKind::Like,
            )
            .await
            .unwrap();

        // Full overlap beats partial overlap beats disjoint.
        fixture.posts.insert(post(author, &["books", "music"], 5));
        fixture.posts.insert(post(author, &["books", "gardening"], 5));
        fixture.posts.insert(post(author, &["knitting"], 5));

        let result = fixture.strategy.recommend(viewer, 2).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[0].score.total >= result[1].score.total);
        assert!((result[0].score.content - 1.0).abs() < 1e-9);
    }
}
