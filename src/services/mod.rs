pub mod activity;
pub mod interest;
pub mod listing_ranking;
pub mod recommendation;
pub mod similarity;
pub mod tags;

pub use activity::relevance::relevance_score;
pub use activity::{ActivityTracker, BulkTrackItem, BulkTrackSummary};
pub use interest::{normalize_weights, InterestTracker};
pub use listing_ranking::{ListingPage, ListingRanker};
pub use recommendation::{DedicatedStrategy, FeedRankingStrategy};
pub use similarity::{cosine, SimilarityEngine};
pub use tags::extract_hashtags;
