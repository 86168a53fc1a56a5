//! Feed ranking strategy for the general personalized feed.
//!
//! Algorithm:
//! 1. Base vector = the viewer's normalized interest vector, +1.0 per
//!    declared-interest tag.
//! 2. Top-20 neighbors by cosine similarity (> 0).
//! 3. Cold start (empty base vector and no neighbors): the 20 most recent
//!    posts by other authors, recency order.
//! 4. Per candidate: content = sum of base-vector weights over the post's
//!    distinct tags; collab = sum of liker-neighbor similarities + 1.2 x sum
//!    of commenter-neighbor similarities; final = 0.6 * content +
//!    0.4 * collab.
//! 5. Top 20 by final score, scores stripped from the output. An empty
//!    scored result falls back to the recency list.

use super::{distinct_tags, CANDIDATE_LIMIT};
use crate::models::{Post, UserSimilarity};
use crate::services::interest::InterestTracker;
use crate::services::similarity::SimilarityEngine;
use crate::storage::{PostRepository, UserRepository};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Feed length returned to the viewer.
const FEED_SIZE: usize = 20;
/// Max neighbors contributing collaborative signal.
const MAX_SIMILAR_USERS: usize = 20;
/// Content / collaborative blend.
const CONTENT_WEIGHT: f64 = 0.6;
const COLLAB_WEIGHT: f64 = 0.4;
/// Commenter similarity counts harder than liker similarity.
const COMMENT_SIMILARITY_BOOST: f64 = 1.2;

pub struct FeedRankingStrategy {
    interest: Arc<InterestTracker>,
    similarity: Arc<SimilarityEngine>,
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl FeedRankingStrategy {
    pub fn new(
        interest: Arc<InterestTracker>,
        similarity: Arc<SimilarityEngine>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            interest,
            similarity,
            users,
            posts,
        }
    }

    pub async fn recommend(&self, viewer: Uuid) -> Result<Vec<Post>> {
        let base = self.base_vector(viewer).await?;

        let neighbors = self
            .similarity
            .neighbors_of(viewer, &base, 0.0, Some(MAX_SIMILAR_USERS))
            .await?;

        if base.is_empty() && neighbors.is_empty() {
            return self.recency_fallback(viewer).await;
        }

        let candidates = self.posts.candidate_posts(viewer, CANDIDATE_LIMIT).await?;

        let mut scored: Vec<(Post, f64)> = candidates
            .into_iter()
            .filter(|post| post.author_id != viewer && !post.tags.is_empty())
            .map(|post| {
                let content = content_score(&base, &post);
                let collab = collab_score(&neighbors, &post);
                let total = CONTENT_WEIGHT * content + COLLAB_WEIGHT * collab;
                (post, total)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.created_at.cmp(&a.0.created_at))
        });

        let feed: Vec<Post> = scored
            .into_iter()
            .take(FEED_SIZE)
            .map(|(post, _)| post)
            .collect();

        if feed.is_empty() {
            return self.recency_fallback(viewer).await;
        }

        info!(
            viewer = %viewer,
            neighbor_count = neighbors.len(),
            feed_size = feed.len(),
            "Personalized feed ranked"
        );

        Ok(feed)
    }

    /// Normalized interest vector plus +1.0 per declared-interest tag.
    async fn base_vector(&self, viewer: Uuid) -> Result<HashMap<String, f64>> {
        let mut base = self.interest.vector_for(viewer).await?;

        if let Some(profile) = self.users.get(viewer).await? {
            for tag in &profile.declared_interests {
                *base.entry(tag.to_lowercase()).or_insert(0.0) += 1.0;
            }
        }

        Ok(base)
    }

    async fn recency_fallback(&self, viewer: Uuid) -> Result<Vec<Post>> {
        let posts = self.posts.recent_posts_by_others(viewer, FEED_SIZE).await?;
        info!(
            viewer = %viewer,
            post_count = posts.len(),
            "Cold-start fallback feed"
        );
        Ok(posts)
    }
}

/// Weighted presence of the base vector over the post's distinct tags: a dot
/// product against a binary post vector, not a cosine.
fn content_score(base: &HashMap<String, f64>, post: &Post) -> f64 {
    distinct_tags(&post.tags)
        .iter()
        .filter_map(|tag| base.get(tag))
        .sum()
}

fn collab_score(neighbors: &[UserSimilarity], post: &Post) -> f64 {
    let mut score = 0.0;
    for neighbor in neighbors {
        if post.liked_by.contains(&neighbor.user_id) {
            score += neighbor.similarity;
        }
        if post.commented_by.contains(&neighbor.user_id) {
            score += COMMENT_SIMILARITY_BOOST * neighbor.similarity;
        }
    }
    score
}
