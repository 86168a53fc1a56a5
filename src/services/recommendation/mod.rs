// ============================================
// Post Recommendation
// ============================================
//
// Two feed-scoring strategies ship side by side because the platform ranks
// feeds two different ways depending on entry point:
//
// - FeedRankingStrategy: the general personalized feed. Weighted-presence
//   content score plus liker/commenter collaborative signal, 0.6/0.4 blend,
//   recency fallback for cold-start viewers.
// - DedicatedStrategy: the standalone recommendation surface. Cosine content
//   score plus liker/author collaborative signal, 0.7/0.3 blend, transparent
//   score breakdown in the output.
//
// Neither formula is canonical; they are kept as independently testable
// strategies rather than merged.

pub mod dedicated;
pub mod feed_ranking;

pub use dedicated::DedicatedStrategy;
pub use feed_ranking::FeedRankingStrategy;

use std::collections::{HashMap, HashSet};

/// Upper bound on the candidate posts considered per request. Keeps the
/// scoring scan bounded; no timeout or cancellation exists below this.
pub(crate) const CANDIDATE_LIMIT: usize = 200;

/// Distinct lowercase tags of a post. Stored tag arrays may repeat a tag;
/// scoring treats the post as a binary tag vector.
pub(crate) fn distinct_tags(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|tag| tag.to_lowercase()).collect()
}

/// Binary tag-presence vector for cosine scoring.
pub(crate) fn binary_tag_vector(tags: &[String]) -> HashMap<String, f64> {
    distinct_tags(tags)
        .into_iter()
        .map(|tag| (tag, 1.0))
        .collect()
}
