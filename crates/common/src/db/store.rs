//! Storage abstraction injected into the review service

use async_trait::async_trait;

use crate::domain::{Comment, Movie, NewMovie};
use crate::errors::Result;

/// Persistence operations for movies and their comments.
///
/// Each call is its own unit of work: writes are committed before the call
/// returns and nothing is held open between calls.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Every movie with its comments, in storage order
    async fn list_movies(&self) -> Result<Vec<Movie>>;

    async fn movie_exists(&self, name: &str) -> Result<bool>;

    /// Comments of one movie in insertion order, `None` if the movie is absent
    async fn comments_for(&self, movie_name: &str) -> Result<Option<Vec<Comment>>>;

    /// Fails with `MovieExists` when the name is taken
    async fn insert_movie(&self, movie: NewMovie) -> Result<()>;

    /// Removes the movie and all of its comments; `false` if it was absent
    async fn delete_movie(&self, name: &str) -> Result<bool>;

    /// Fails with `MovieNotFound` when `comment.movie_name` does not resolve
    async fn insert_comment(&self, comment: Comment) -> Result<()>;

    /// Removes every comment by `user_name` on the movie.
    ///
    /// Returns the number removed, or `None` if the movie is absent.
    async fn delete_comments(&self, movie_name: &str, user_name: &str) -> Result<Option<u64>>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<()>;

    /// Short name for logs and health output
    fn backend_name(&self) -> &'static str;
}
