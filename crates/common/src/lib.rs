//! MovieReview Common Library
//!
//! Shared code for the MovieReview gateway including:
//! - Domain records and the review service
//! - Storage abstraction with SQL and in-memory stores
//! - Sentiment classifier abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod sentiment;
pub mod service;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::MovieStore;
pub use errors::{AppError, Result};
pub use sentiment::SentimentClassifier;
pub use service::ReviewService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
