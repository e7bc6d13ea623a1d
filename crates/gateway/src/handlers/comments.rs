//! Comment handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{ApiJson, MessageResponse};
use crate::AppState;
use moviereview_common::{
    domain::{AverageScores, NewComment, MAX_RATE_SCORE, MIN_RATE_SCORE},
    errors::{AppError, Result},
};

/// Submitted review. `emotion` and `confidence_score` are derived server-side
/// and ignored if a client sends them.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    pub movie_name: String,

    pub user_name: String,

    pub comment: String,

    #[validate(range(min = MIN_RATE_SCORE, max = MAX_RATE_SCORE))]
    pub rate_score: i32,
}

impl From<AddCommentRequest> for NewComment {
    fn from(request: AddCommentRequest) -> Self {
        NewComment {
            movie_name: request.movie_name,
            user_name: request.user_name,
            comment: request.comment,
            rate_score: request.rate_score,
        }
    }
}

/// Classify and store a review; 404 if the movie does not exist
pub async fn add_comment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddCommentRequest>,
) -> Result<Json<MessageResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("rate_score".to_string()),
    })?;

    state.service.add_comment(request.into()).await?;

    Ok(Json(MessageResponse::new("Comment added successfully")))
}

/// Delete every comment by the user on the movie; 404 if the movie does not exist
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((movie_name, user_name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state.service.delete_comment(&movie_name, &user_name).await?;

    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

/// Mean rating and confidence of a movie's comments
pub async fn average_score(
    State(state): State<AppState>,
    Path(movie_name): Path<String>,
) -> Result<Json<AverageScores>> {
    Ok(Json(state.service.average_scores(&movie_name).await?))
}
