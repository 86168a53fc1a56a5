use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::models::{FeedStrategyKind, InteractionKind, Post, ScoredPost};
use crate::services::extract_hashtags;
use crate::services::recommendation::dedicated::DEFAULT_LIMIT;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct FeedQuery {
    pub strategy: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub strategy: FeedStrategyKind,
    pub posts: Vec<Post>,
}

#[derive(Serialize)]
pub struct ScoredFeedResponse {
    pub strategy: FeedStrategyKind,
    pub posts: Vec<ScoredPost>,
}

/// GET /feed/{user_id}?strategy=feed_ranking|dedicated&limit=
/// The dedicated strategy returns posts with their score breakdown; the
/// general feed strips scores.
#[get("/feed/{user_id}")]
pub async fn get_feed(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();

    let strategy = match &query.strategy {
        Some(raw) => raw
            .parse::<FeedStrategyKind>()
            .map_err(AppError::ValidationError)?,
        None => FeedStrategyKind::FeedRanking,
    };

    match strategy {
        FeedStrategyKind::FeedRanking => {
            let posts = state.feed_ranking.recommend(user_id).await?;
            Ok(HttpResponse::Ok().json(FeedResponse { strategy, posts }))
        }
        FeedStrategyKind::Dedicated => {
            let posts = state
                .dedicated
                .recommend(user_id, query.limit.unwrap_or(DEFAULT_LIMIT))
                .await?;
            Ok(HttpResponse::Ok().json(ScoredFeedResponse { strategy, posts }))
        }
    }
}

#[derive(Deserialize)]
pub struct InteractionRequest {
    pub user_id: Uuid,
    pub action: String,
    /// The post's stored tag array, when available.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free text to extract hashtags from when no stored tags exist.
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct InteractionResponse {
    pub recorded: bool,
    pub tag_count: usize,
}

/// POST /interactions
/// Feed one post interaction into the viewer's interest vector.
#[post("/interactions")]
pub async fn record_interaction(
    state: web::Data<AppState>,
    body: web::Json<InteractionRequest>,
) -> Result<HttpResponse> {
    let kind = body
        .action
        .parse::<InteractionKind>()
        .map_err(AppError::ValidationError)?;

    let body = body.into_inner();
    let tags = if body.tags.is_empty() {
        extract_hashtags(body.content.as_deref().unwrap_or_default())
    } else {
        body.tags
    };

    state
        .interest
        .apply_interaction(body.user_id, &tags, kind)
        .await?;

    Ok(HttpResponse::Ok().json(InteractionResponse {
        recorded: true,
        tag_count: tags.len(),
    }))
}
