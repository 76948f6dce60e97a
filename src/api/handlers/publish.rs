//! Publish endpoint handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{PublishRequest, PublishResponse};
use crate::app_state::AppState;
use crate::auth::extract_token;
use crate::error::{BrokerError, ErrorResponse};

/// `POST /publish` — Broadcast a message to entitled subscribers.
///
/// The publisher credential is checked before the body is looked at, so
/// an unauthorized caller gets 403 even with a malformed body.
///
/// # Errors
///
/// Returns [`BrokerError`] on denial, credential verification failure, or
/// a malformed body.
#[utoipa::path(
    post,
    path = "/publish",
    tag = "Publish",
    summary = "Publish a message",
    description = "Delivers `data` as a text frame to every connected subscriber entitled to `topic`. Delivery is best-effort and not acknowledged per subscriber.",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Message broadcast", body = PublishResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 403, description = "Publisher not authorized", body = ErrorResponse),
        (status = 500, description = "Credential could not be verified", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BrokerError> {
    let token = extract_token(&headers, &uri);
    state.broker.authorize_publish(&token)?;

    let Json(req) = body.map_err(|rejection| BrokerError::InvalidRequest(rejection.body_text()))?;
    state.broker.broadcast(&req.topic, &req.data).await;

    Ok(Json(PublishResponse {
        message: "published".to_string(),
        topic: req.topic,
    }))
}

/// Publish routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/publish", post(publish))
}
