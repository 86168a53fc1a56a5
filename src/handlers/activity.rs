use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::models::{ActivityEvent, ListingEventType, TrackOutcome};
use crate::services::activity::BulkTrackItem;
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct TrackRequest {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub admitted: bool,
    pub event: Option<ActivityEvent>,
}

/// POST /activity/track
/// Record one listing event; duplicates within the dedup window come back
/// with admitted = false.
#[post("/activity/track")]
pub async fn track_event(
    state: web::Data<AppState>,
    body: web::Json<TrackRequest>,
) -> Result<HttpResponse> {
    let event_type: ListingEventType = body
        .event_type
        .parse()
        .map_err(AppError::ValidationError)?;

    let metadata = body.metadata.clone().unwrap_or(serde_json::Value::Null);
    let outcome = state
        .activity
        .track(body.listing_id, body.user_id, event_type, metadata)
        .await?;

    let response = match outcome {
        TrackOutcome::Admitted(event) => TrackResponse {
            admitted: true,
            event: Some(event),
        },
        TrackOutcome::Suppressed => TrackResponse {
            admitted: false,
            event: None,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

#[derive(Deserialize)]
pub struct BulkTrackRequest {
    pub events: Vec<BulkTrackItem>,
}

/// POST /activity/track/bulk
/// Each item validates independently; the batch always completes.
#[post("/activity/track/bulk")]
pub async fn track_events_bulk(
    state: web::Data<AppState>,
    body: web::Json<BulkTrackRequest>,
) -> Result<HttpResponse> {
    let summary = state.activity.track_bulk(body.into_inner().events).await;
    Ok(HttpResponse::Ok().json(summary))
}
