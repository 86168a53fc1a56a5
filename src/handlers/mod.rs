pub mod activity;
pub mod discover;
pub mod feed;
pub mod listings;

// Re-export handlers for convenience
pub use activity::{track_event, track_events_bulk, BulkTrackRequest, TrackRequest, TrackResponse};
pub use discover::{get_similar_users, SimilarUsersResponse};
pub use feed::{get_feed, record_interaction, FeedQuery, InteractionRequest};
pub use listings::{get_listing_relevance, rank_listings, ListingRelevanceResponse, RankQuery};

use crate::services::{
    ActivityTracker, DedicatedStrategy, FeedRankingStrategy, InterestTracker, ListingRanker,
    SimilarityEngine,
};
use crate::storage::ListingRepository;
use std::sync::Arc;

/// Shared handler state. Handlers go through the services; only the
/// not-found checks touch a repository directly.
pub struct AppState {
    pub interest: Arc<InterestTracker>,
    pub similarity: Arc<SimilarityEngine>,
    pub feed_ranking: Arc<FeedRankingStrategy>,
    pub dedicated: Arc<DedicatedStrategy>,
    pub activity: Arc<ActivityTracker>,
    pub listing_ranker: Arc<ListingRanker>,
    pub listings: Arc<dyn ListingRepository>,
}
