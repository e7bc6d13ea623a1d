//! Plain-text movie cards

use moviereview_common::domain::{AverageScores, Movie, MAX_RATE_SCORE};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

/// Fixed-width progress bar for a fraction in 0.0..=1.0
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Rating as filled and empty stars
pub fn stars(rate_score: i32) -> String {
    let filled = rate_score.clamp(0, MAX_RATE_SCORE) as usize;
    format!(
        "{}{}",
        "*".repeat(filled),
        ".".repeat(MAX_RATE_SCORE as usize - filled)
    )
}

/// One card: movie details, then score bars and comments if it has any
pub fn movie_card(movie: &Movie, scores: Option<&AverageScores>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== {} ==", movie.name);
    let _ = writeln!(out, "Director:  {}", movie.director);
    let _ = writeln!(out, "Opened:    {}", movie.open_date);
    let _ = writeln!(out, "Genre:     {}", movie.genre);
    let _ = writeln!(out, "Poster:    {}", movie.poster_url);

    if movie.comments.is_empty() {
        let _ = writeln!(out, "No reviews yet");
        return out;
    }

    match scores {
        Some(scores) => {
            let _ = writeln!(
                out,
                "Rating:     {} {:.2}/{}",
                bar(scores.average_rate_score / MAX_RATE_SCORE as f64, BAR_WIDTH),
                scores.average_rate_score,
                MAX_RATE_SCORE
            );
            let _ = writeln!(
                out,
                "Confidence: {} {:.2}",
                bar(scores.average_confidence_score, BAR_WIDTH),
                scores.average_confidence_score
            );
        }
        None => {
            let _ = writeln!(out, "Scores unavailable");
        }
    }

    let _ = writeln!(out, "Reviews:");
    for comment in &movie.comments {
        let _ = writeln!(
            out,
            "  {} [{}] {}: {} ({} {:.2})",
            stars(comment.rate_score),
            comment.rate_score,
            comment.user_name,
            comment.comment,
            comment.emotion,
            comment.confidence_score
        );
    }

    out
}
