//! Integration tests for the MovieReview HTTP API
//!
//! Drives the full router over both stores:
//! - Movie add/list/delete
//! - Comment add/delete with classification
//! - Average scores
//! - Error status mapping

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use moviereview_common::{
    config::AppConfig,
    db::{DbPool, MemoryStore, SqlStore},
    errors::{AppError, Result},
    sentiment::{Classification, FixedClassifier, LexiconClassifier, Sentiment, SentimentClassifier},
    ReviewService,
};
use moviereview_gateway::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn memory_app() -> Router {
    let service = ReviewService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FixedClassifier::new(Sentiment::Positive, 0.8)),
    );
    create_router(AppState::new(AppConfig::default(), service))
}

async fn sql_app() -> Router {
    let pool = DbPool::in_memory().await.unwrap();
    pool.ensure_schema().await.unwrap();
    let service = ReviewService::new(
        Arc::new(SqlStore::new(pool)),
        Arc::new(LexiconClassifier::new()),
    );
    create_router(AppState::new(AppConfig::default(), service))
}

/// Remote-style classifier whose endpoint is down
struct UnreachableClassifier;

#[async_trait]
impl SentimentClassifier for UnreachableClassifier {
    async fn classify(&self, _text: &str) -> Classification {
        Classification::fallback()
    }

    fn provider(&self) -> &str {
        "unreachable"
    }

    async fn ping(&self) -> Result<()> {
        Err(AppError::ClassifierError {
            message: "connection refused".to_string(),
        })
    }
}

/// Send a raw body with an explicit content type
async fn send_raw(app: &Router, path: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Helper function to make HTTP requests to the router
async fn make_request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(path);

    let request = match body {
        Some(json_body) => request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json_body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json_body)
}

fn dune() -> Value {
    json!({
        "name": "Dune",
        "director": "Villeneuve",
        "open_date": "2021-10-22",
        "genre": "SciFi",
        "poster_url": "http://x/p.jpg",
        "comments": []
    })
}

fn review(user: &str, text: &str, rate_score: i32) -> Value {
    json!({
        "movie_name": "Dune",
        "user_name": user,
        "comment": text,
        "rate_score": rate_score
    })
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = memory_app();

    let (status, body) = make_request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    let (status, body) = make_request(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["backend"], "memory");
    assert_eq!(body["checks"]["classifier"]["provider"], "fixed");
    assert_eq!(body["checks"]["classifier"]["status"], "up");
}

#[tokio::test]
async fn test_ready_degraded_when_classifier_unreachable() {
    let service = ReviewService::new(Arc::new(MemoryStore::new()), Arc::new(UnreachableClassifier));
    let app = create_router(AppState::new(AppConfig::default(), service));

    let (status, body) = make_request(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["database"]["status"], "up");
    assert_eq!(body["checks"]["classifier"]["status"], "down");
    assert!(body["checks"]["classifier"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = memory_app();
    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;

    // Missing required field
    let (status, body) =
        make_request(&app, Method::POST, "/movies/add", Some(json!({ "name": "Arrival" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Non-integer rating
    let mut comment = review("al", "great", 5);
    comment["rate_score"] = json!("five");
    let (status, body) =
        make_request(&app, Method::POST, "/movies/comments/add", Some(comment)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Broken JSON
    let (status, body) = send_raw(&app, "/movies/add", "application/json", "{\"name\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Wrong content type
    let (status, body) =
        send_raw(&app, "/movies/comments/add", "text/plain", &review("al", "great", 5).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies.as_array().unwrap().len(), 1);
    assert_eq!(movies[0]["comments"], json!([]));
}

#[tokio::test]
async fn test_dune_scenario() {
    let app = sql_app().await;

    let (status, body) = make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Movie added successfully");

    let (status, body) =
        make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "great", 5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment added successfully");

    let (status, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(status, StatusCode::OK);
    let comment = &movies[0]["comments"][0];
    assert_eq!(comment["user_name"], "al");
    assert_eq!(comment["emotion"], "POSITIVE");
    let confidence = comment["confidence_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));

    let (status, scores) =
        make_request(&app, Method::POST, "/movies/comments/Dune/average_score", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scores["average_rate_score"], 5.0);
    assert_eq!(scores["average_confidence_score"].as_f64().unwrap(), confidence);
}

#[tokio::test]
async fn test_duplicate_movie_is_bad_request() {
    let app = memory_app();

    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    let (status, body) = make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_MOVIE");

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_movie_cascades_and_absent_delete_succeeds() {
    let app = sql_app().await;

    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "boring", 2))).await;

    let (status, body) = make_request(&app, Method::DELETE, "/movies/delete/Dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Movie deleted successfully");

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies, json!([]));

    let (status, _) = make_request(&app, Method::DELETE, "/movies/delete/Dune", None).await;
    assert_eq!(status, StatusCode::OK);

    // Re-adding starts from an empty comment list
    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies[0]["comments"], json!([]));
}

#[tokio::test]
async fn test_comment_on_missing_movie_is_not_found() {
    let app = memory_app();

    let (status, body) =
        make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "great", 5))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "MOVIE_NOT_FOUND");

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies, json!([]));
}

#[tokio::test]
async fn test_rating_validated_at_boundary() {
    let app = memory_app();
    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;

    for rate_score in [0, 6] {
        let (status, body) = make_request(
            &app,
            Method::POST,
            "/movies/comments/add",
            Some(review("al", "great", rate_score)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies[0]["comments"], json!([]));
}

#[tokio::test]
async fn test_client_supplied_derived_fields_are_ignored() {
    let app = memory_app();
    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;

    let mut body = review("al", "great", 4);
    body["emotion"] = json!("NEGATIVE");
    body["confidence_score"] = json!(0.01);
    let (status, _) = make_request(&app, Method::POST, "/movies/comments/add", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies[0]["comments"][0]["emotion"], "POSITIVE");
    assert_eq!(movies[0]["comments"][0]["confidence_score"], 0.8);
}

#[tokio::test]
async fn test_delete_comment_semantics() {
    let app = memory_app();
    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "great", 5))).await;
    make_request(&app, Method::POST, "/movies/comments/add", Some(review("bo", "fine", 3))).await;
    make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "again", 4))).await;

    let (status, body) =
        make_request(&app, Method::DELETE, "/movies/comments/delete/Dune/al", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment deleted successfully");

    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    let users: Vec<_> = movies[0]["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["user_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(users, ["bo"]);

    // Existing movie, no matching comment
    let (status, _) =
        make_request(&app, Method::DELETE, "/movies/comments/delete/Dune/zed", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        make_request(&app, Method::DELETE, "/movies/comments/delete/Nonexistent/al", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_average_score_paths() {
    let app = memory_app();

    let (status, _) =
        make_request(&app, Method::POST, "/movies/comments/Nonexistent/average_score", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    make_request(&app, Method::POST, "/movies/add", Some(dune())).await;
    let (status, scores) =
        make_request(&app, Method::POST, "/movies/comments/Dune/average_score", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scores, json!({ "average_rate_score": 0.0, "average_confidence_score": 0.0 }));

    make_request(&app, Method::POST, "/movies/comments/add", Some(review("al", "great", 5))).await;
    make_request(&app, Method::POST, "/movies/comments/add", Some(review("bo", "meh", 2))).await;
    let (_, scores) =
        make_request(&app, Method::POST, "/movies/comments/Dune/average_score", None).await;
    assert_eq!(scores["average_rate_score"], 3.5);
    assert_eq!(scores["average_confidence_score"], 0.8);
}

#[tokio::test]
async fn test_names_are_percent_decoded() {
    let app = memory_app();
    let mut movie = dune();
    movie["name"] = json!("Blade Runner");
    make_request(&app, Method::POST, "/movies/add", Some(movie)).await;

    let (status, _) =
        make_request(&app, Method::POST, "/movies/comments/Blade%20Runner/average_score", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = make_request(&app, Method::DELETE, "/movies/delete/Blade%20Runner", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, movies) = make_request(&app, Method::GET, "/movies/get", None).await;
    assert_eq!(movies, json!([]));
}
