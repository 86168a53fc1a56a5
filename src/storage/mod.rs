// ============================================
// Storage Abstraction
// ============================================
//
// The engine owns two mutable stores (interest vectors, activity events) and
// reads users/posts/listings from repositories supplied by the platform's
// persistence layer. Everything is injected as a trait object so the engine
// carries no transport or database dependency of its own.
//
// Correctness requirements at this seam:
// - `InterestVectorStore::apply_deltas` is atomic per user with a zero floor
//   on every weight.
// - `ActivityEventStore::insert_unless_duplicate` is a single conditional
//   insert; two near-simultaneous duplicates cannot both be admitted.

pub mod memory;
pub mod redis;

pub use self::memory::{
    InMemoryActivityStore, InMemoryListingRepository, InMemoryPostRepository,
    InMemoryUserRepository, InMemoryVectorStore,
};
pub use self::redis::{RedisActivityStore, RedisVectorStore};

use crate::models::{ActivityCounts, ActivityEvent, Listing, Post, TagVector, UserProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Engine-owned store for per-user interest vectors.
#[async_trait]
pub trait InterestVectorStore: Send + Sync {
    /// Load one user's stored vector, if any.
    async fn load(&self, user_id: Uuid) -> Result<Option<TagVector>>;

    /// Load every stored vector. Input to the all-pairs similarity scan.
    async fn load_all(&self) -> Result<Vec<TagVector>>;

    /// Atomically apply per-tag weight deltas for one user, flooring each
    /// resulting weight at zero. Creates the record if absent and bumps its
    /// updated-at timestamp.
    async fn apply_deltas(&self, user_id: Uuid, deltas: &[(String, f64)]) -> Result<()>;
}

/// Engine-owned store for marketplace activity events.
#[async_trait]
pub trait ActivityEventStore: Send + Sync {
    /// Admit `event` unless an event with the same (listing, user, type)
    /// triple was admitted within the trailing `window_secs`. Returns whether
    /// the event was admitted. Must be a single conditional insert.
    async fn insert_unless_duplicate(&self, event: ActivityEvent, window_secs: i64)
        -> Result<bool>;

    /// Aggregate counts per event type for one listing, zero-defaulted.
    async fn counts_for(&self, listing_id: Uuid) -> Result<ActivityCounts>;

    /// Batched aggregate counts. Ids with no events may be absent; callers
    /// zero-fill.
    async fn bulk_counts(&self, listing_ids: &[Uuid]) -> Result<HashMap<Uuid, ActivityCounts>>;
}

/// Platform users with their declared interests.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>>;
}

/// Platform posts with tags and engagement edges.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Candidate posts for ranking: authored by someone other than `viewer`,
    /// newest first, bounded by `limit`.
    async fn candidate_posts(&self, viewer: Uuid, limit: usize) -> Result<Vec<Post>>;

    /// Most recent posts by authors other than `viewer`, newest first. The
    /// cold-start fallback feed.
    async fn recent_posts_by_others(&self, viewer: Uuid, limit: usize) -> Result<Vec<Post>>;
}

/// Marketplace listings.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn get(&self, listing_id: Uuid) -> Result<Option<Listing>>;

    /// Listings to rank, optionally filtered by category, newest first,
    /// bounded by `limit`.
    async fn list(&self, category: Option<&str>, limit: usize) -> Result<Vec<Listing>>;
}
