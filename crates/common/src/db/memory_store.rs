//! In-process movie store, lost on restart

use crate::db::store::MovieStore;
use crate::domain::{Comment, Movie, NewMovie};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Movies kept in a list behind one lock.
///
/// Each check-and-write runs under a single write guard, so name uniqueness
/// and comment/movie existence hold under concurrent requests.
#[derive(Default)]
pub struct MemoryStore {
    movies: RwLock<Vec<Movie>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        Ok(self.movies.read().await.clone())
    }

    async fn movie_exists(&self, name: &str) -> Result<bool> {
        Ok(self.movies.read().await.iter().any(|m| m.name == name))
    }

    async fn comments_for(&self, movie_name: &str) -> Result<Option<Vec<Comment>>> {
        Ok(self
            .movies
            .read()
            .await
            .iter()
            .find(|m| m.name == movie_name)
            .map(|m| m.comments.clone()))
    }

    async fn insert_movie(&self, movie: NewMovie) -> Result<()> {
        let mut movies = self.movies.write().await;

        if movies.iter().any(|m| m.name == movie.name) {
            return Err(AppError::MovieExists { name: movie.name });
        }

        movies.push(movie.into_movie());
        Ok(())
    }

    async fn delete_movie(&self, name: &str) -> Result<bool> {
        let mut movies = self.movies.write().await;
        let before = movies.len();
        movies.retain(|m| m.name != name);
        Ok(movies.len() != before)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<()> {
        let mut movies = self.movies.write().await;

        let movie = movies
            .iter_mut()
            .find(|m| m.name == comment.movie_name)
            .ok_or_else(|| AppError::movie_not_found(&comment.movie_name))?;

        movie.comments.push(comment);
        Ok(())
    }

    async fn delete_comments(&self, movie_name: &str, user_name: &str) -> Result<Option<u64>> {
        let mut movies = self.movies.write().await;

        let Some(movie) = movies.iter_mut().find(|m| m.name == movie_name) else {
            return Ok(None);
        };

        let before = movie.comments.len();
        movie.comments.retain(|c| c.user_name != user_name);
        Ok(Some((before - movie.comments.len()) as u64))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
