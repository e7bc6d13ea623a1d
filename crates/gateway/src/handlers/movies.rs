//! Movie management handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{ApiJson, MessageResponse};
use crate::AppState;
use moviereview_common::{
    domain::{Movie, NewMovie},
    errors::{AppError, Result},
};

/// Request to register a movie.
///
/// A `comments` array, if present, is ignored: movies always start empty.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMovieRequest {
    #[validate(length(min = 1, max = 500))]
    pub name: String,

    pub director: String,

    pub open_date: String,

    pub genre: String,

    pub poster_url: String,
}

impl From<AddMovieRequest> for NewMovie {
    fn from(request: AddMovieRequest) -> Self {
        NewMovie {
            name: request.name,
            director: request.director,
            open_date: request.open_date,
            genre: request.genre,
            poster_url: request.poster_url,
        }
    }
}

/// List every movie with its comments
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>> {
    Ok(Json(state.service.list_movies().await?))
}

/// Register a movie; 400 if the name is taken
pub async fn add_movie(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddMovieRequest>,
) -> Result<Json<MessageResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    state.service.add_movie(request.into()).await?;

    Ok(Json(MessageResponse::new("Movie added successfully")))
}

/// Delete a movie and its comments.
///
/// Deleting a movie that does not exist also answers 200.
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    match state.service.delete_movie(&name).await {
        Ok(()) => {}
        Err(AppError::MovieNotFound { .. }) => {
            tracing::debug!(movie = %name, "Delete of absent movie ignored");
        }
        Err(e) => return Err(e),
    }

    Ok(Json(MessageResponse::new("Movie deleted successfully")))
}
