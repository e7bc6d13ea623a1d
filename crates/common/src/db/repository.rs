//! SQL-backed movie store
//!
//! Every write runs inside one transaction that is committed before the call
//! returns. Existence checks are repeated inside that transaction and backed
//! by the UNIQUE constraint on `movies.name` and the foreign key on
//! `comments.movie_id`, so a racing writer surfaces as `MovieExists` or
//! `MovieNotFound` instead of a raw database error.
//!
//! SQLite permits one writer at a time, and two deferred transactions that
//! both read before writing fail with `SQLITE_BUSY` rather than waiting. On
//! that backend the store therefore runs its write transactions one at a time.

use crate::db::models::*;
use crate::db::store::MovieStore;
use crate::db::DbPool;
use crate::domain::{Comment, Movie, NewMovie};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Movie store over SeaORM
#[derive(Clone)]
pub struct SqlStore {
    pool: DbPool,
    /// Held for the whole of each write transaction; SQLite only
    write_lock: Option<Arc<Mutex<()>>>,
}

impl SqlStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        let write_lock = (pool.conn().get_database_backend() == DbBackend::Sqlite)
            .then(|| Arc::new(Mutex::new(())));

        Self { pool, write_lock }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    async fn write_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

async fn find_movie<C: ConnectionTrait>(conn: &C, name: &str) -> Result<Option<MovieRow>> {
    MovieEntity::find()
        .filter(MovieColumn::Name.eq(name))
        .one(conn)
        .await
        .map_err(Into::into)
}

fn to_comment(row: CommentRow, movie_name: &str) -> Comment {
    Comment {
        movie_name: movie_name.to_string(),
        user_name: row.user_name,
        comment: row.comment,
        emotion: row.emotion,
        confidence_score: row.confidence_score,
        rate_score: row.rate_score,
    }
}

fn to_movie(row: MovieRow, comments: Vec<Comment>) -> Movie {
    Movie {
        name: row.name,
        director: row.director,
        open_date: row.open_date,
        genre: row.genre,
        poster_url: row.poster_url,
        comments,
    }
}

/// Translate constraint violations into domain errors
fn map_constraint(err: DbErr, movie_name: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::MovieExists {
            name: movie_name.to_string(),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::movie_not_found(movie_name),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl MovieStore for SqlStore {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let movies = MovieEntity::find()
            .order_by_asc(MovieColumn::Id)
            .all(self.conn())
            .await?;

        let mut comments_by_movie: HashMap<i32, Vec<CommentRow>> = HashMap::new();
        for row in CommentEntity::find()
            .order_by_asc(CommentColumn::Id)
            .all(self.conn())
            .await?
        {
            comments_by_movie.entry(row.movie_id).or_default().push(row);
        }

        Ok(movies
            .into_iter()
            .map(|movie| {
                let comments = comments_by_movie
                    .remove(&movie.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|row| to_comment(row, &movie.name))
                    .collect();
                to_movie(movie, comments)
            })
            .collect())
    }

    async fn movie_exists(&self, name: &str) -> Result<bool> {
        let count = MovieEntity::find()
            .filter(MovieColumn::Name.eq(name))
            .count(self.conn())
            .await?;

        Ok(count > 0)
    }

    async fn comments_for(&self, movie_name: &str) -> Result<Option<Vec<Comment>>> {
        let Some(movie) = find_movie(self.conn(), movie_name).await? else {
            return Ok(None);
        };

        let comments = CommentEntity::find()
            .filter(CommentColumn::MovieId.eq(movie.id))
            .order_by_asc(CommentColumn::Id)
            .all(self.conn())
            .await?
            .into_iter()
            .map(|row| to_comment(row, &movie.name))
            .collect();

        Ok(Some(comments))
    }

    async fn insert_movie(&self, movie: NewMovie) -> Result<()> {
        let _guard = self.write_guard().await;
        let txn = self.conn().begin().await?;

        if find_movie(&txn, &movie.name).await?.is_some() {
            return Err(AppError::MovieExists { name: movie.name });
        }

        let name = movie.name.clone();
        let row = MovieActiveModel {
            name: Set(movie.name),
            director: Set(movie.director),
            open_date: Set(movie.open_date),
            genre: Set(movie.genre),
            poster_url: Set(movie.poster_url),
            ..Default::default()
        };

        row.insert(&txn).await.map_err(|e| map_constraint(e, &name))?;
        txn.commit().await?;

        Ok(())
    }

    async fn delete_movie(&self, name: &str) -> Result<bool> {
        let _guard = self.write_guard().await;
        let txn = self.conn().begin().await?;

        let Some(movie) = find_movie(&txn, name).await? else {
            return Ok(false);
        };

        // Explicit cascade; the foreign key covers stores created elsewhere
        CommentEntity::delete_many()
            .filter(CommentColumn::MovieId.eq(movie.id))
            .exec(&txn)
            .await?;

        MovieEntity::delete_by_id(movie.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(true)
    }

    async fn insert_comment(&self, comment: Comment) -> Result<()> {
        let _guard = self.write_guard().await;
        let txn = self.conn().begin().await?;

        let movie = find_movie(&txn, &comment.movie_name)
            .await?
            .ok_or_else(|| AppError::movie_not_found(&comment.movie_name))?;

        let row = CommentActiveModel {
            movie_id: Set(movie.id),
            user_name: Set(comment.user_name),
            comment: Set(comment.comment),
            rate_score: Set(comment.rate_score),
            emotion: Set(comment.emotion),
            confidence_score: Set(comment.confidence_score),
            ..Default::default()
        };

        row.insert(&txn)
            .await
            .map_err(|e| map_constraint(e, &comment.movie_name))?;
        txn.commit().await?;

        Ok(())
    }

    async fn delete_comments(&self, movie_name: &str, user_name: &str) -> Result<Option<u64>> {
        let _guard = self.write_guard().await;
        let txn = self.conn().begin().await?;

        let Some(movie) = find_movie(&txn, movie_name).await? else {
            return Ok(None);
        };

        let result = CommentEntity::delete_many()
            .filter(CommentColumn::MovieId.eq(movie.id))
            .filter(CommentColumn::UserName.eq(user_name))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(Some(result.rows_affected))
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "sql"
    }
}
