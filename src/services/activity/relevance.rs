//! Relevance scoring for marketplace listings.
//!
//! A listing's relevance is the weighted sum of its activity counts. The
//! default table favors conversion signals (offers) over passive ones
//! (views); callers may substitute their own table to explore different
//! ranking philosophies.

use crate::models::{ActivityCounts, RelevanceWeights};

/// score = view_weight * views + click_weight * clicks + offer_weight * offers
pub fn relevance_score(counts: &ActivityCounts, weights: &RelevanceWeights) -> f64 {
    weights.view * counts.views as f64
        + weights.click * counts.clicks as f64
        + weights.offer * counts.offers as f64
}
