//! MovieReview command-line client
//!
//! Talks to the gateway over HTTP: lists movie cards with score bars and
//! adds or deletes movies and comments. Gateway errors are printed as
//! returned and the process exits non-zero.

mod api;
mod render;

use anyhow::Result;
use api::{ApiClient, Reply};
use clap::{Parser, Subcommand};
use moviereview_common::domain::{AverageScores, Movie, NewComment, NewMovie};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moviereview")]
#[command(about = "Browse and review movies through the MovieReview gateway")]
#[command(version)]
struct Cli {
    /// Gateway base URL
    #[arg(long, env = "BACKEND_BASE_URL", default_value = "http://127.0.0.1:8000")]
    backend_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 90)]
    timeout: u64,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every movie with its scores and comments
    List,

    /// Register a movie
    AddMovie {
        #[arg(long)]
        name: String,
        #[arg(long)]
        director: String,
        #[arg(long)]
        open_date: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        poster_url: String,
    },

    /// Delete a movie and its comments
    DeleteMovie { name: String },

    /// Review a movie
    AddComment {
        movie: String,
        #[arg(long)]
        user: String,
        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=5))]
        rating: i32,
        #[arg(long)]
        text: String,
    },

    /// Delete every comment a user left on a movie
    DeleteComment { movie: String, user: String },

    /// Show a movie's average rating and confidence
    Stats { movie: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let api = ApiClient::new(&cli.backend_url, Duration::from_secs(cli.timeout))?;

    let reply = match cli.command {
        Commands::List => return list(&api).await,
        Commands::AddMovie {
            name,
            director,
            open_date,
            genre,
            poster_url,
        } => {
            let movie = NewMovie {
                name,
                director,
                open_date,
                genre,
                poster_url,
            };
            api.add_movie(&movie).await?
        }
        Commands::DeleteMovie { name } => api.delete_movie(&name).await?,
        Commands::AddComment {
            movie,
            user,
            rating,
            text,
        } => {
            let comment = NewComment {
                movie_name: movie,
                user_name: user,
                comment: text,
                rate_score: rating,
            };
            api.add_comment(&comment).await?
        }
        Commands::DeleteComment { movie, user } => api.delete_comment(&movie, &user).await?,
        Commands::Stats { movie } => {
            let reply = api.average_score(&movie).await?;
            if !reply.is_success() {
                return Ok(failure(&reply));
            }
            let scores: AverageScores = reply.json()?;
            println!("Average rating:     {:.2}", scores.average_rate_score);
            println!("Average confidence: {:.2}", scores.average_confidence_score);
            return Ok(ExitCode::SUCCESS);
        }
    };

    if !reply.is_success() {
        return Ok(failure(&reply));
    }
    println!("{}", message_of(&reply));
    Ok(ExitCode::SUCCESS)
}

/// Render every movie as a card, fetching scores per movie
async fn list(api: &ApiClient) -> Result<ExitCode> {
    let reply = api.list_movies().await?;
    if !reply.is_success() {
        return Ok(failure(&reply));
    }

    let movies: Vec<Movie> = reply.json()?;
    if movies.is_empty() {
        println!("No movies yet. Add one with `moviereview add-movie`.");
        return Ok(ExitCode::SUCCESS);
    }

    for movie in &movies {
        if movie.comments.is_empty() {
            println!("{}", render::movie_card(movie, None));
            continue;
        }

        let scores = match api.average_score(&movie.name).await {
            Ok(reply) => scores_from(&movie.name, &reply),
            Err(e) => {
                tracing::warn!(movie = %movie.name, error = %e, "Score lookup failed");
                None
            }
        };
        println!("{}", render::movie_card(movie, scores.as_ref()));
    }

    Ok(ExitCode::SUCCESS)
}

/// Decode a score reply; failures are logged and shown as unavailable
fn scores_from(movie_name: &str, reply: &Reply) -> Option<AverageScores> {
    if !reply.is_success() {
        tracing::warn!(movie = %movie_name, status = %reply.status, "Score lookup failed");
        return None;
    }

    match reply.json::<AverageScores>() {
        Ok(scores) => Some(scores),
        Err(e) => {
            tracing::warn!(movie = %movie_name, error = %e, "Score lookup failed");
            None
        }
    }
}

/// Print a gateway error exactly as returned
fn failure(reply: &Reply) -> ExitCode {
    eprintln!("{} {}", reply.status, reply.body);
    ExitCode::FAILURE
}

/// The `message` field of a success body, or the body itself
fn message_of(reply: &Reply) -> String {
    serde_json::from_str::<serde_json::Value>(&reply.body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| reply.body.clone())
}
