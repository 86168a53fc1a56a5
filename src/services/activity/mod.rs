// ============================================
// Activity Tracker
// ============================================
//
// Records marketplace listing events (view / click / offer) with duplicate
// suppression: a same (listing, user, event type) triple inside the trailing
// 5-minute window is rejected at write time. Suppression is an idempotent
// no-op, not a failure.

pub mod relevance;

use crate::models::{ActivityCounts, ActivityEvent, ListingEventType, TrackOutcome};
use crate::storage::ActivityEventStore;
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Trailing dedup window for identical event triples.
const DEDUP_WINDOW_SECS: i64 = 300;

/// One item of a bulk tracking request. The event type stays a raw string so
/// each item validates independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTrackItem {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Per-item failure inside a bulk tracking request.
#[derive(Debug, Clone, Serialize)]
pub struct BulkTrackError {
    pub index: usize,
    pub error: String,
}

/// Outcome tally of a bulk tracking request. The batch always completes;
/// failures are isolated per item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkTrackSummary {
    pub tracked: usize,
    pub suppressed: usize,
    pub errors: Vec<BulkTrackError>,
}

pub struct ActivityTracker {
    store: Arc<dyn ActivityEventStore>,
}

impl ActivityTracker {
    pub fn new(store: Arc<dyn ActivityEventStore>) -> Self {
        Self { store }
    }

    /// Attempt to admit a new event. Returns `Suppressed` when a same-triple
    /// event was admitted within the trailing window.
    pub async fn track(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
        event_type: ListingEventType,
        metadata: serde_json::Value,
    ) -> Result<TrackOutcome> {
        let event = ActivityEvent {
            id: Uuid::new_v4(),
            listing_id,
            user_id,
            event_type,
            occurred_at: Utc::now(),
            metadata,
        };

        let admitted = self
            .store
            .insert_unless_duplicate(event.clone(), DEDUP_WINDOW_SECS)
            .await?;

        if admitted {
            debug!(
                listing_id = %listing_id,
                user_id = %user_id,
                event_type = %event_type,
                "Activity event admitted"
            );
            Ok(TrackOutcome::Admitted(event))
        } else {
            debug!(
                listing_id = %listing_id,
                user_id = %user_id,
                event_type = %event_type,
                "Duplicate activity event suppressed"
            );
            Ok(TrackOutcome::Suppressed)
        }
    }

    /// Validate and track each item independently; one bad item never aborts
    /// the batch.
    pub async fn track_bulk(&self, items: Vec<BulkTrackItem>) -> BulkTrackSummary {
        let mut summary = BulkTrackSummary::default();

        for (index, item) in items.into_iter().enumerate() {
            let event_type: ListingEventType = match item.event_type.parse() {
                Ok(parsed) => parsed,
                Err(error) => {
                    summary.errors.push(BulkTrackError { index, error });
                    continue;
                }
            };

            let metadata = item.metadata.unwrap_or(serde_json::Value::Null);
            match self
                .track(item.listing_id, item.user_id, event_type, metadata)
                .await
            {
                Ok(TrackOutcome::Admitted(_)) => summary.tracked += 1,
                Ok(TrackOutcome::Suppressed) => summary.suppressed += 1,
                Err(error) => summary.errors.push(BulkTrackError {
                    index,
                    error: error.to_string(),
                }),
            }
        }

        summary
    }

    /// Aggregate counts for one listing, zero-defaulted.
    pub async fn counts_for(&self, listing_id: Uuid) -> Result<ActivityCounts> {
        Ok(self.store.counts_for(listing_id).await?)
    }

    /// Batched aggregate counts; every requested id appears in the result,
    /// all-zero when no events exist.
    pub async fn bulk_counts(
        &self,
        listing_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ActivityCounts>> {
        let mut counts = self.store.bulk_counts(listing_ids).await?;
        for listing_id in listing_ids {
            counts.entry(*listing_id).or_default();
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryActivityStore;
    use serde_json::Value;

    fn tracker() -> ActivityTracker {
        ActivityTracker::new(Arc::new(InMemoryActivityStore::new()))
    }

    #[tokio::test]
    async fn test_second_view_within_window_suppressed() {
        let tracker = tracker();
        let listing = Uuid::new_v4();
        let user = Uuid::new_v4();

        let first = tracker
            .track(listing, user, ListingEventType::View, Value::Null)
            .await
            .unwrap();
        let second = tracker
            .track(listing, user, ListingEventType::View, Value::Null)
            .await
            .unwrap();

        assert!(first.is_admitted());
        assert!(!second.is_admitted());

        let counts = tracker.counts_for(listing).await.unwrap();
        assert_eq!(counts.views, 1);
    }

    #[tokio::test]
    async fn test_distinct_users_both_admitted() {
        let tracker = tracker();
        let listing = Uuid::new_v4();

        for _ in 0..2 {
            let outcome = tracker
                .track(listing, Uuid::new_v4(), ListingEventType::Offer, Value::Null)
                .await
                .unwrap();
            assert!(outcome.is_admitted());
        }

        let counts = tracker.counts_for(listing).await.unwrap();
        assert_eq!(counts.offers, 2);
    }

    #[tokio::test]
    async fn test_bulk_counts_zero_fills_unknown_listings() {
        let tracker = tracker();
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();

        tracker
            .track(known, Uuid::new_v4(), ListingEventType::Click, Value::Null)
            .await
            .unwrap();

        let counts = tracker.bulk_counts(&[known, unknown]).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&known].clicks, 1);
        assert_eq!(counts[&unknown], ActivityCounts::default());
    }

    #[tokio::test]
    async fn test_bulk_tracking_isolates_bad_items() {
        let tracker = tracker();
        let listing = Uuid::new_v4();
        let user = Uuid::new_v4();

        let items = vec![
            BulkTrackItem {
                listing_id: listing,
                user_id: user,
                event_type: "view".to_string(),
                metadata: None,
            },
            BulkTrackItem {
                listing_id: listing,
                user_id: user,
                event_type: "favorite".to_string(),
                metadata: None,
            },
            BulkTrackItem {
                listing_id: listing,
                user_id: user,
                event_type: "view".to_string(),
                metadata: None,
            },
        ];

        let summary = tracker.track_bulk(items).await;
        assert_eq!(summary.tracked, 1);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].index, 1);
    }
}
