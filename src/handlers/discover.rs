use crate::error::Result;
use crate::handlers::AppState;
use crate::models::UserSimilarity;
use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_SIMILAR_LIMIT: usize = 10;

#[derive(Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SimilarUsersResponse {
    pub user_id: Uuid,
    pub similar_users: Vec<UserSimilarity>,
}

/// GET /users/{user_id}/similar?limit=
/// Users closest to this one in interest space. Empty for users with no
/// recorded vector.
#[get("/users/{user_id}/similar")]
pub async fn get_similar_users(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<SimilarQuery>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();

    let similar_users = state
        .similarity
        .similar_users(user_id, query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT))
        .await?;

    Ok(HttpResponse::Ok().json(SimilarUsersResponse {
        user_id,
        similar_users,
    }))
}
