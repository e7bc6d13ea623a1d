//! Domain records exchanged between the service, the stores and the HTTP layer
//!
//! Field names follow the JSON wire format of the review API.

use serde::{Deserialize, Serialize};

use crate::db::models::Sentiment;

/// Lowest accepted rating
pub const MIN_RATE_SCORE: i32 = 1;

/// Highest accepted rating
pub const MAX_RATE_SCORE: i32 = 5;

/// A movie together with its comments in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub name: String,
    pub director: String,
    pub open_date: String,
    pub genre: String,
    pub poster_url: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A stored review, including the fields derived by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub movie_name: String,
    pub user_name: String,
    pub comment: String,
    pub emotion: Sentiment,
    pub confidence_score: f64,
    pub rate_score: i32,
}

/// Fields needed to register a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub name: String,
    pub director: String,
    pub open_date: String,
    pub genre: String,
    pub poster_url: String,
}

impl NewMovie {
    /// The movie as it looks right after insertion
    pub fn into_movie(self) -> Movie {
        Movie {
            name: self.name,
            director: self.director,
            open_date: self.open_date,
            genre: self.genre,
            poster_url: self.poster_url,
            comments: Vec::new(),
        }
    }
}

/// A submitted review before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub movie_name: String,
    pub user_name: String,
    pub comment: String,
    pub rate_score: i32,
}

/// Mean rating and mean classifier confidence for one movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub average_rate_score: f64,
    pub average_confidence_score: f64,
}

impl AverageScores {
    pub const EMPTY: AverageScores = AverageScores {
        average_rate_score: 0.0,
        average_confidence_score: 0.0,
    };

    /// Arithmetic means over `comments`; zero comments give `EMPTY`
    pub fn from_comments(comments: &[Comment]) -> Self {
        if comments.is_empty() {
            return Self::EMPTY;
        }

        let n = comments.len() as f64;
        let total_rating: f64 = comments.iter().map(|c| f64::from(c.rate_score)).sum();
        let total_confidence: f64 = comments.iter().map(|c| c.confidence_score).sum();

        Self {
            average_rate_score: total_rating / n,
            average_confidence_score: total_confidence / n,
        }
    }
}
