pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::AppError;
pub use handlers::AppState;
pub use services::{
    ActivityTracker, DedicatedStrategy, FeedRankingStrategy, InterestTracker, ListingRanker,
    SimilarityEngine,
};
