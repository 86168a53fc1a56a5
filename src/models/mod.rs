use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Per-user sparse interest vector: lowercase tag -> accumulated weight.
///
/// Weights are never negative; zero-weight entries may be dropped during
/// normalization. Created on a user's first tagged interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagVector {
    pub user_id: Uuid,
    pub weights: HashMap<String, f64>,
    pub updated_at: DateTime<Utc>,
}

impl TagVector {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            weights: HashMap::new(),
            updated_at: Utc::now(),
        }
    }
}

/// A user action against a tagged post, with its vector delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Comment,
    View,
    Unlike,
}

impl InteractionKind {
    /// Weight delta applied per tag occurrence.
    pub fn delta(&self) -> f64 {
        match self {
            InteractionKind::Like => 1.0,
            InteractionKind::Comment => 2.0,
            InteractionKind::View => 0.5,
            InteractionKind::Unlike => -1.0,
        }
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(InteractionKind::Like),
            "comment" => Ok(InteractionKind::Comment),
            "view" => Ok(InteractionKind::View),
            "unlike" => Ok(InteractionKind::Unlike),
            other => Err(format!("unknown interaction kind: {}", other)),
        }
    }
}

/// Derived user-pair similarity with both vector snapshots attached for
/// auditability. Never persisted; recomputed per ranking request.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityEdge {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub similarity: f64,
    pub vector_a: HashMap<String, f64>,
    pub vector_b: HashMap<String, f64>,
}

/// A neighbor of some user in interest space.
#[derive(Debug, Clone, Serialize)]
pub struct UserSimilarity {
    pub user_id: Uuid,
    pub similarity: f64,
}

/// Marketplace listing event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingEventType {
    View,
    Click,
    Offer,
}

impl ListingEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingEventType::View => "view",
            ListingEventType::Click => "click",
            ListingEventType::Offer => "offer",
        }
    }
}

impl fmt::Display for ListingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(ListingEventType::View),
            "click" => Ok(ListingEventType::Click),
            "offer" => Ok(ListingEventType::Offer),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Immutable record of one user's interaction with one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub event_type: ListingEventType,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Result of an admission attempt. Suppression is a defined outcome of the
/// dedup window, not a failure.
#[derive(Debug, Clone)]
pub enum TrackOutcome {
    Admitted(ActivityEvent),
    Suppressed,
}

impl TrackOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, TrackOutcome::Admitted(_))
    }
}

/// Aggregate event counts for one listing, zero-defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub views: u64,
    pub clicks: u64,
    pub offers: u64,
}

/// Weight table turning activity counts into a relevance score. Callers may
/// substitute their own table (view-weighted vs. conversion-weighted).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelevanceWeights {
    pub view: f64,
    pub click: f64,
    pub offer: f64,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            view: 0.1,
            click: 0.3,
            offer: 0.6,
        }
    }
}

/// A social-feed post as supplied by the persistence layer. Tags are the
/// stored extraction result and may contain duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub tags: Vec<String>,
    /// Users who liked the post.
    pub liked_by: Vec<Uuid>,
    /// Users who commented on the post.
    pub commented_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A marketplace listing as supplied by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub category: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Minimal user view: the engine only needs declared interests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub declared_interests: Vec<String>,
}

/// Content/collaborative/final score triple attached to transparent
/// recommendation output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub content: f64,
    pub collaborative: f64,
    pub total: f64,
}

/// A post together with its score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub post: Post,
    pub score: ScoreBreakdown,
}

/// Feed-scoring strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStrategyKind {
    FeedRanking,
    Dedicated,
}

impl FromStr for FeedStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feed_ranking" | "feed-ranking" | "feed" => Ok(FeedStrategyKind::FeedRanking),
            "dedicated" => Ok(FeedStrategyKind::Dedicated),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Listing sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    Relevance,
    MostViewed,
    Newest,
}

impl FromStr for ListingSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(ListingSort::Relevance),
            "most-viewed" | "most_viewed" => Ok(ListingSort::MostViewed),
            "newest" => Ok(ListingSort::Newest),
            other => Err(format!("unknown sort mode: {}", other)),
        }
    }
}

/// A listing with ranking signals attached when the sort mode uses them.
#[derive(Debug, Clone, Serialize)]
pub struct RankedListing {
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<ActivityCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
