use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use personalization_service::config::{Config, StorageBackend};
use personalization_service::handlers::{
    get_feed, get_listing_relevance, get_similar_users, rank_listings, record_interaction,
    track_event, track_events_bulk, AppState,
};
use personalization_service::services::{
    ActivityTracker, DedicatedStrategy, FeedRankingStrategy, InterestTracker, ListingRanker,
    SimilarityEngine,
};
use personalization_service::storage::{
    ActivityEventStore, InMemoryActivityStore, InMemoryListingRepository, InMemoryPostRepository,
    InMemoryUserRepository, InMemoryVectorStore, InterestVectorStore, ListingRepository,
    PostRepository, RedisActivityStore, RedisVectorStore, UserRepository,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!(
        "Starting {} v{}",
        config.service.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Engine-owned stores
    let (vector_store, activity_store): (Arc<dyn InterestVectorStore>, Arc<dyn ActivityEventStore>) =
        match config.storage.backend {
            StorageBackend::Redis => {
                tracing::info!("Using Redis storage at {}", config.redis.url);
                let redis_client = redis::Client::open(config.redis.url.clone())
                    .expect("Failed to create Redis client");
                (
                    Arc::new(RedisVectorStore::new(redis_client.clone())),
                    Arc::new(RedisActivityStore::new(redis_client)),
                )
            }
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                (
                    Arc::new(InMemoryVectorStore::new()),
                    Arc::new(InMemoryActivityStore::new()),
                )
            }
        };

    // Collaborator repositories. A production deployment wires the platform's
    // persistence layer in here; the in-memory ones keep the engine
    // self-contained.
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
    let listings: Arc<dyn ListingRepository> = Arc::new(InMemoryListingRepository::new());

    // Services
    let interest = Arc::new(InterestTracker::new(vector_store.clone()));
    let similarity = Arc::new(SimilarityEngine::new(vector_store));
    let feed_ranking = Arc::new(FeedRankingStrategy::new(
        interest.clone(),
        similarity.clone(),
        users.clone(),
        posts.clone(),
    ));
    let dedicated = Arc::new(DedicatedStrategy::new(
        interest.clone(),
        similarity.clone(),
        posts.clone(),
    ));
    let activity = Arc::new(ActivityTracker::new(activity_store));
    let listing_ranker = Arc::new(ListingRanker::new(activity.clone()));

    let state = web::Data::new(AppState {
        interest,
        similarity,
        feed_ranking,
        dedicated,
        activity,
        listing_ranker,
        listings,
    });

    let http_port = config.service.http_port;

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(track_event)
            .service(track_events_bulk)
            .service(get_listing_relevance)
            .service(rank_listings)
            .service(get_feed)
            .service(record_interaction)
            .service(get_similar_users)
    })
    .bind(("0.0.0.0", http_port))?
    .run()
    .await
}
