//! Review service
//!
//! The business rules of the application: movie add/list/delete, comment
//! add/delete and score aggregation. Storage and classification are injected
//! so the same rules run over SQL or in-memory stores and any classifier.

use crate::db::MovieStore;
use crate::domain::{AverageScores, Comment, Movie, NewComment, NewMovie, MAX_RATE_SCORE, MIN_RATE_SCORE};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::sentiment::SentimentClassifier;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn MovieStore>,
    classifier: Arc<dyn SentimentClassifier>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MovieStore>, classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &Arc<dyn MovieStore> {
        &self.store
    }

    pub fn classifier(&self) -> &Arc<dyn SentimentClassifier> {
        &self.classifier
    }

    /// Every stored movie with its comments
    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        self.store.list_movies().await
    }

    /// Register a movie; `MovieExists` if the name is taken
    pub async fn add_movie(&self, movie: NewMovie) -> Result<()> {
        if self.store.movie_exists(&movie.name).await? {
            return Err(AppError::MovieExists { name: movie.name });
        }

        let name = movie.name.clone();
        self.store.insert_movie(movie).await?;

        metrics::record_movie_added();
        info!(movie = %name, "Movie added");
        Ok(())
    }

    /// Remove a movie and its comments; `MovieNotFound` if absent
    pub async fn delete_movie(&self, name: &str) -> Result<()> {
        if !self.store.delete_movie(name).await? {
            return Err(AppError::movie_not_found(name));
        }

        metrics::record_movie_deleted();
        info!(movie = %name, "Movie deleted");
        Ok(())
    }

    /// Classify and store a review.
    ///
    /// The movie is resolved before the classifier runs, so a review of an
    /// unknown movie costs no classification and writes nothing.
    pub async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        validate_rate_score(comment.rate_score)?;

        if !self.store.movie_exists(&comment.movie_name).await? {
            return Err(AppError::movie_not_found(comment.movie_name));
        }

        let started = Instant::now();
        let classification = self.classifier.classify(&comment.comment).await;
        let elapsed = started.elapsed();
        metrics::record_classification(elapsed.as_secs_f64(), self.classifier.provider());

        debug!(
            provider = self.classifier.provider(),
            label = %classification.label,
            confidence = classification.confidence,
            elapsed_ms = elapsed.as_millis() as u64,
            "Comment classified"
        );

        let stored = Comment {
            movie_name: comment.movie_name,
            user_name: comment.user_name,
            comment: comment.comment,
            emotion: classification.label,
            confidence_score: classification.confidence,
            rate_score: comment.rate_score,
        };

        self.store.insert_comment(stored.clone()).await?;

        metrics::record_comment_added(stored.emotion.as_str());
        info!(
            movie = %stored.movie_name,
            user = %stored.user_name,
            emotion = %stored.emotion,
            "Comment added"
        );
        Ok(stored)
    }

    /// Remove every comment by `user_name` on the movie.
    ///
    /// Success even when the user had no comment there; `MovieNotFound` only
    /// when the movie itself is absent. Returns how many were removed.
    pub async fn delete_comment(&self, movie_name: &str, user_name: &str) -> Result<u64> {
        let removed = self
            .store
            .delete_comments(movie_name, user_name)
            .await?
            .ok_or_else(|| AppError::movie_not_found(movie_name))?;

        metrics::record_comments_deleted(removed);
        info!(movie = %movie_name, user = %user_name, removed, "Comments deleted");
        Ok(removed)
    }

    /// Mean rating and mean confidence; `(0.0, 0.0)` without comments
    pub async fn average_scores(&self, movie_name: &str) -> Result<AverageScores> {
        let comments = self
            .store
            .comments_for(movie_name)
            .await?
            .ok_or_else(|| AppError::movie_not_found(movie_name))?;

        Ok(AverageScores::from_comments(&comments))
    }
}

/// Reject ratings outside 1..=5
pub fn validate_rate_score(rate_score: i32) -> Result<()> {
    if (MIN_RATE_SCORE..=MAX_RATE_SCORE).contains(&rate_score) {
        Ok(())
    } else {
        Err(AppError::Validation {
            message: format!(
                "rate_score must be between {} and {}, got {}",
                MIN_RATE_SCORE, MAX_RATE_SCORE, rate_score
            ),
            field: Some("rate_score".to_string()),
        })
    }
}
