use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::models::{ActivityCounts, ListingSort, RelevanceWeights};
use crate::services::relevance_score;
use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on listings pulled into one ranking pass.
const LISTING_SCAN_LIMIT: usize = 500;

#[derive(Serialize)]
pub struct ListingRelevanceResponse {
    pub listing_id: Uuid,
    pub counts: ActivityCounts,
    pub score: f64,
}

/// GET /listings/{listing_id}/relevance
#[get("/listings/{listing_id}/relevance")]
pub async fn get_listing_relevance(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let listing_id = path.into_inner();

    if state.listings.get(listing_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Listing {} not found",
            listing_id
        )));
    }

    let counts = state.activity.counts_for(listing_id).await?;
    let score = relevance_score(&counts, &RelevanceWeights::default());

    Ok(HttpResponse::Ok().json(ListingRelevanceResponse {
        listing_id,
        counts,
        score,
    }))
}

#[derive(Deserialize)]
pub struct RankQuery {
    pub sort_by: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// GET /listings/rank?sort_by=relevance|most-viewed|newest&category=&page=&page_size=
#[get("/listings/rank")]
pub async fn rank_listings(
    state: web::Data<AppState>,
    query: web::Query<RankQuery>,
) -> Result<HttpResponse> {
    let sort = match &query.sort_by {
        Some(raw) => raw
            .parse::<ListingSort>()
            .map_err(AppError::ValidationError)?,
        None => ListingSort::Relevance,
    };

    let candidates = state
        .listings
        .list(query.category.as_deref(), LISTING_SCAN_LIMIT)
        .await?;

    let page = state
        .listing_ranker
        .rank(
            candidates,
            sort,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}
