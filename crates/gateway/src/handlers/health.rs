//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use crate::AppState;
use std::time::Instant;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckResult,
    pub classifier: ClassifierCheck,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ClassifierCheck {
    pub status: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: moviereview_common::VERSION.to_string(),
    })
}

/// Readiness probe.
///
/// `not_ready` when the store is down. A classifier outage only degrades
/// the service, since classification falls back to a neutral label.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let store = state.service.store();
    let start = Instant::now();

    let db_check = match store.ping().await {
        Ok(_) => CheckResult {
            status: "up".to_string(),
            backend: store.backend_name().to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            backend: store.backend_name().to_string(),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let classifier = state.service.classifier();
    let start = Instant::now();

    let classifier_check = match classifier.ping().await {
        Ok(_) => ClassifierCheck {
            status: "up".to_string(),
            provider: classifier.provider().to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::warn!(provider = classifier.provider(), error = %e, "Classifier not reachable");
            ClassifierCheck {
                status: "down".to_string(),
                provider: classifier.provider().to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    };

    let status = match (db_check.status.as_str(), classifier_check.status.as_str()) {
        ("up", "up") => "ready",
        ("up", _) => "degraded",
        _ => "not_ready",
    };

    Json(ReadyResponse {
        status: status.to_string(),
        checks: HealthChecks {
            database: db_check,
            classifier: classifier_check,
        },
    })
}
