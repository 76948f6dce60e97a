//! System endpoints: liveness and health.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AliveResponse {
    /// Fixed greeting.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 timestamp of the check.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Number of registered subscriber connections.
    pub connections: usize,
    /// Registered subscribers entitled to each topic.
    pub topics: BTreeMap<String, usize>,
    /// Whether publishing requires a signed token.
    pub publisher_secured: bool,
    /// Whether subscribing requires a signed token.
    pub subscriber_secured: bool,
}

/// `GET /` — Liveness probe with a fixed payload.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Process is alive", body = AliveResponse),
    )
)]
pub async fn root_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(AliveResponse {
            message: "I am alive! 👋".to_string(),
        }),
    )
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, current timestamp, the live subscriber count and per-topic subscriber counts.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let gate = state.broker.gate();
    let registry = state.broker.registry();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connections: registry.len().await,
            topics: registry.topic_counts().await,
            publisher_secured: gate.publisher_secured(),
            subscriber_secured: gate.subscriber_secured(),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}
