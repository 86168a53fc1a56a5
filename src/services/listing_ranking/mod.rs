// ============================================
// Listing Ranker
// ============================================
//
// Orders marketplace listings by relevance score, raw view count, or
// recency, with creation-time tie-breaks and offset/limit pagination.

use crate::models::{Listing, ListingSort, RankedListing, RelevanceWeights};
use crate::services::activity::relevance::relevance_score;
use crate::services::activity::ActivityTracker;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// One page of ranked listings.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub listings: Vec<RankedListing>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

pub struct ListingRanker {
    activity: Arc<ActivityTracker>,
    weights: RelevanceWeights,
}

impl ListingRanker {
    pub fn new(activity: Arc<ActivityTracker>) -> Self {
        Self {
            activity,
            weights: RelevanceWeights::default(),
        }
    }

    /// Substitute the relevance weight table.
    pub fn with_weights(mut self, weights: RelevanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Rank `candidates` by `sort`, then paginate. `page` is 1-based;
    /// `page_size` of 0 falls back to the default.
    pub async fn rank(
        &self,
        candidates: Vec<Listing>,
        sort: ListingSort,
        page: usize,
        page_size: usize,
    ) -> Result<ListingPage> {
        let page = page.max(1);
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };

        let mut ranked: Vec<RankedListing> = match sort {
            ListingSort::Newest => candidates
                .into_iter()
                .map(|listing| RankedListing {
                    listing,
                    counts: None,
                    score: None,
                })
                .collect(),
            ListingSort::Relevance | ListingSort::MostViewed => {
                let ids: Vec<Uuid> = candidates.iter().map(|l| l.id).collect();
                let counts = self.activity.bulk_counts(&ids).await?;

                candidates
                    .into_iter()
                    .map(|listing| {
                        let listing_counts =
                            counts.get(&listing.id).copied().unwrap_or_default();
                        let score = match sort {
                            ListingSort::Relevance => {
                                relevance_score(&listing_counts, &self.weights)
                            }
                            _ => listing_counts.views as f64,
                        };
                        RankedListing {
                            listing,
                            counts: Some(listing_counts),
                            score: Some(score),
                        }
                    })
                    .collect()
            }
        };

        // Score descending, creation time descending on ties. Newest sorts
        // purely by creation time.
        ranked.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.listing.created_at.cmp(&a.listing.created_at))
        });

        let total = ranked.len();
        let offset = (page - 1) * page_size;
        let listings: Vec<RankedListing> =
            ranked.into_iter().skip(offset).take(page_size).collect();

        debug!(
            total,
            page,
            page_size,
            returned = listings.len(),
            sort = ?sort,
            "Listings ranked"
        );

        Ok(ListingPage {
            listings,
            page,
            page_size,
            total,
        })
    }
}
