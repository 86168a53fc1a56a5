//! In-memory storage backed by `DashMap`.
//!
//! Default wiring and test fixture. The entry API holds a shard lock for the
//! duration of each mutation, which makes vector deltas and dedup admission
//! atomic without a separate concurrency layer.

use super::{
    ActivityEventStore, InterestVectorStore, ListingRepository, PostRepository, Result,
    UserRepository,
};
use crate::models::{ActivityCounts, ActivityEvent, Listing, ListingEventType, Post, TagVector, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

/// Interest vectors keyed by user.
#[derive(Default)]
pub struct InMemoryVectorStore {
    vectors: DashMap<Uuid, TagVector>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterestVectorStore for InMemoryVectorStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<TagVector>> {
        Ok(self.vectors.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn load_all(&self) -> Result<Vec<TagVector>> {
        Ok(self.vectors.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn apply_deltas(&self, user_id: Uuid, deltas: &[(String, f64)]) -> Result<()> {
        // Entry guard keeps the whole read-modify-write under one shard lock.
        let mut entry = self
            .vectors
            .entry(user_id)
            .or_insert_with(|| TagVector::new(user_id));
        for (tag, delta) in deltas {
            let weight = entry.weights.entry(tag.clone()).or_insert(0.0);
            *weight = (*weight + delta).max(0.0);
        }
        entry.updated_at = Utc::now();
        Ok(())
    }
}

/// Activity events with per-triple dedup state.
#[derive(Default)]
pub struct InMemoryActivityStore {
    /// Last admitted timestamp per (listing, user, event type) triple.
    last_admitted: DashMap<(Uuid, Uuid, ListingEventType), DateTime<Utc>>,
    /// Admitted events per listing.
    events: DashMap<Uuid, Vec<ActivityEvent>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityEventStore for InMemoryActivityStore {
    async fn insert_unless_duplicate(
        &self,
        event: ActivityEvent,
        window_secs: i64,
    ) -> Result<bool> {
        let key = (event.listing_id, event.user_id, event.event_type);
        let window = Duration::seconds(window_secs);

        // The admission decision happens under the entry lock for the triple.
        let mut admitted = false;
        self.last_admitted
            .entry(key)
            .and_modify(|last| {
                if event.occurred_at - *last >= window {
                    *last = event.occurred_at;
                    admitted = true;
                }
            })
            .or_insert_with(|| {
                admitted = true;
                event.occurred_at
            });

        if admitted {
            self.events.entry(event.listing_id).or_default().push(event);
        }
        Ok(admitted)
    }

    async fn counts_for(&self, listing_id: Uuid) -> Result<ActivityCounts> {
        let mut counts = ActivityCounts::default();
        if let Some(events) = self.events.get(&listing_id) {
            for event in events.iter() {
                match event.event_type {
                    ListingEventType::View => counts.views += 1,
                    ListingEventType::Click => counts.clicks += 1,
                    ListingEventType::Offer => counts.offers += 1,
                }
            }
        }
        Ok(counts)
    }

    async fn bulk_counts(&self, listing_ids: &[Uuid]) -> Result<HashMap<Uuid, ActivityCounts>> {
        let mut result = HashMap::with_capacity(listing_ids.len());
        for listing_id in listing_ids {
            result.insert(*listing_id, self.counts_for(*listing_id).await?);
        }
        Ok(result)
    }
}

/// Seed-able user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, UserProfile>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: UserProfile) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.get(&user_id).map(|entry| entry.value().clone()))
    }
}

/// Seed-able post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: DashMap<Uuid, Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, post: Post) {
        self.posts.insert(post.id, post);
    }

    fn by_others_newest_first(&self, viewer: Uuid, limit: usize) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| entry.author_id != viewer)
            .map(|entry| entry.value().clone())
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        posts
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn candidate_posts(&self, viewer: Uuid, limit: usize) -> Result<Vec<Post>> {
        Ok(self.by_others_newest_first(viewer, limit))
    }

    async fn recent_posts_by_others(&self, viewer: Uuid, limit: usize) -> Result<Vec<Post>> {
        Ok(self.by_others_newest_first(viewer, limit))
    }
}

/// Seed-able listing repository.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: DashMap<Uuid, Listing>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: Listing) {
        self.listings.insert(listing.id, listing);
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn get(&self, listing_id: Uuid) -> Result<Option<Listing>> {
        Ok(self.listings.get(&listing_id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, category: Option<&str>, limit: usize) -> Result<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .listings
            .iter()
            .filter(|entry| category.map_or(true, |c| entry.category == c))
            .map(|entry| entry.value().clone())
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listings.truncate(limit);
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn view_event(listing_id: Uuid, user_id: Uuid, occurred_at: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            id: Uuid::new_v4(),
            listing_id,
            user_id,
            event_type: ListingEventType::View,
            occurred_at,
            metadata: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_apply_deltas_floors_at_zero() {
        let store = InMemoryVectorStore::new();
        let user = Uuid::new_v4();

        store
            .apply_deltas(user, &[("books".to_string(), 1.0)])
            .await
            .unwrap();
        store
            .apply_deltas(user, &[("books".to_string(), -3.0)])
            .await
            .unwrap();

        let vector = store.load(user).await.unwrap().unwrap();
        assert_eq!(vector.weights.get("books"), Some(&0.0));
    }

    #[tokio::test]
    async fn test_apply_deltas_creates_record() {
        let store = InMemoryVectorStore::new();
        let user = Uuid::new_v4();

        assert!(store.load(user).await.unwrap().is_none());
        store
            .apply_deltas(user, &[("vinyl".to_string(), 0.5)])
            .await
            .unwrap();
        assert!(store.load(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_event_suppressed_within_window() {
        let store = InMemoryActivityStore::new();
        let listing = Uuid::new_v4();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let first = store
            .insert_unless_duplicate(view_event(listing, user, now), 300)
            .await
            .unwrap();
        let second = store
            .insert_unless_duplicate(
                view_event(listing, user, now + Duration::seconds(10)),
                300,
            )
            .await
            .unwrap();
        let third = store
            .insert_unless_duplicate(
                view_event(listing, user, now + Duration::seconds(301)),
                300,
            )
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert!(third);

        let counts = store.counts_for(listing).await.unwrap();
        assert_eq!(counts.views, 2);
    }

    #[tokio::test]
    async fn test_different_event_types_do_not_collide() {
        let store = InMemoryActivityStore::new();
        let listing = Uuid::new_v4();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let mut click = view_event(listing, user, now);
        click.event_type = ListingEventType::Click;

        assert!(store
            .insert_unless_duplicate(view_event(listing, user, now), 300)
            .await
            .unwrap());
        assert!(store.insert_unless_duplicate(click, 300).await.unwrap());
    }

    #[tokio::test]
    async fn test_bulk_counts_missing_listing_absent() {
        let store = InMemoryActivityStore::new();
        let listing = Uuid::new_v4();

        let counts = store.bulk_counts(&[listing]).await.unwrap();
        assert_eq!(counts.get(&listing), Some(&ActivityCounts::default()));
    }
}
