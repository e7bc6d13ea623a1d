//! API handlers module

pub mod comments;
pub mod health;
pub mod movies;

use axum::extract::FromRequest;
use moviereview_common::AppError;
use serde::{Deserialize, Serialize};

/// JSON body extractor; malformed bodies come back in the API error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Body of every successful mutation
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
