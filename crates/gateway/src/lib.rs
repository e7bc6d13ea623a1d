//! MovieReview API Gateway
//!
//! HTTP surface of the review service:
//! - Movie and comment endpoints
//! - Health and readiness probes
//! - Request tracing, request ids, CORS and a global request timeout

pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use moviereview_common::{config::AppConfig, ReviewService};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: ReviewService,
}

impl AppState {
    pub fn new(config: AppConfig, service: ReviewService) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration; the client may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Movie endpoints
        .route("/movies/get", get(handlers::movies::list_movies))
        .route("/movies/add", post(handlers::movies::add_movie))
        .route("/movies/delete/{name}", delete(handlers::movies::delete_movie))

        // Comment endpoints
        .route("/movies/comments/add", post(handlers::comments::add_comment))
        .route(
            "/movies/comments/delete/{movie_name}/{user_name}",
            delete(handlers::comments::delete_comment),
        )
        .route(
            "/movies/comments/{movie_name}/average_score",
            post(handlers::comments::average_score),
        )

        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
