//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;

use crate::app_state::AppState;
use crate::auth::extract_token;
use crate::error::BrokerError;

/// `GET /subscribe` — Authorize and upgrade to a subscriber WebSocket.
///
/// # Errors
///
/// Returns [`BrokerError`] if the credential cannot be verified or the
/// request is not a WebSocket upgrade.
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, BrokerError> {
    let token = extract_token(&headers, &uri);
    state.broker.handshake(upgrade, &token)
}
